//! Byte-sourced scans: BOM detection, fallback encodings, and the
//! `<meta>`-driven mid-document re-decode.

use soupscan::{HtmlScanner, InputSource, ScannerConfig};
use soupscan_test_support::Recorder;

fn scan_bytes_with(config: ScannerConfig, bytes: Vec<u8>) -> Recorder {
    let recorder = Recorder::new();
    let mut scanner = HtmlScanner::with_config(config);
    scanner.set_document_handler(Box::new(recorder.clone()));
    scanner.set_error_reporter(Box::new(recorder.clone()));
    scanner
        .set_input_source(InputSource::from_bytes(bytes))
        .unwrap();
    assert!(!scanner.scan_document(true).unwrap());
    recorder
}

fn scan_bytes(bytes: Vec<u8>) -> Recorder {
    scan_bytes_with(ScannerConfig::default(), bytes)
}

fn reporting() -> ScannerConfig {
    ScannerConfig {
        report_errors: true,
        ..ScannerConfig::default()
    }
}

#[test]
fn bytes_without_a_bom_fall_back_to_the_default_encoding() {
    let recorder = scan_bytes_with(reporting(), b"<p>x</p>".to_vec());
    assert_eq!(
        recorder.events(),
        vec![
            "startDocument(Windows-1252)",
            "startElement(p,[])",
            "characters(\"x\")",
            "endElement(p)",
            "endDocument",
        ]
    );
    assert_eq!(recorder.diagnostics(), vec!["warning HTML1000"]);
}

#[test]
fn a_utf8_bom_selects_utf8_and_is_consumed() {
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice("<p>é</p>".as_bytes());
    let recorder = scan_bytes(bytes);
    assert_eq!(
        recorder.events(),
        vec![
            "startDocument(UTF-8)",
            "startElement(p,[])",
            "characters(\"é\")",
            "endElement(p)",
            "endDocument",
        ]
    );
}

#[test]
fn utf16_boms_select_the_matching_byte_order() {
    let text = "<p>é</p>";

    let mut le = vec![0xFF, 0xFE];
    le.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    let recorder = scan_bytes(le);
    assert_eq!(recorder.events()[0], "startDocument(UTF-16)");
    assert_eq!(recorder.character_data(), "é");

    let mut be = vec![0xFE, 0xFF];
    be.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    let recorder = scan_bytes(be);
    assert_eq!(recorder.events()[0], "startDocument(UTF-16)");
    assert_eq!(recorder.character_data(), "é");
}

#[test]
fn an_explicit_encoding_overrides_detection() {
    let recorder = scan_bytes_with(ScannerConfig::default(), Vec::new());
    assert_eq!(recorder.events()[0], "startDocument(Windows-1252)");

    let recorder = {
        let inner = Recorder::new();
        let mut scanner = HtmlScanner::new();
        scanner.set_document_handler(Box::new(inner.clone()));
        scanner
            .set_input_source(
                InputSource::from_bytes("<p>é</p>".as_bytes().to_vec()).with_encoding("utf-8"),
            )
            .unwrap();
        scanner.scan_document(true).unwrap();
        inner
    };
    assert_eq!(recorder.events()[0], "startDocument(utf-8)");
    assert_eq!(recorder.character_data(), "é");
}

#[test]
fn an_unsupported_explicit_encoding_fails_to_open() {
    let mut scanner = HtmlScanner::new();
    let result = scanner.set_input_source(
        InputSource::from_bytes(b"<p>x</p>".to_vec()).with_encoding("x-no-such-charset"),
    );
    assert!(result.is_err());
}

#[test]
fn meta_charset_triggers_a_replay_under_the_declared_encoding() {
    // The é is UTF-8 encoded but the document opens under the Windows-1252
    // default; only the replay decodes it correctly.
    let html = "<html><head>\
                <meta http-equiv=\"content-type\" content=\"text/html;charset=UTF-8\">\
                </head><body>é</body></html>";
    let recorder = scan_bytes(html.as_bytes().to_vec());
    assert_eq!(
        recorder.events(),
        vec![
            "startDocument(Windows-1252)",
            "startElement(html,[])",
            "startElement(head,[])",
            "startElement(meta,[http-equiv=\"content-type\",content=\"text/html;charset=UTF-8\"])",
            "endElement(head)",
            "startElement(body,[])",
            "characters(\"é\")",
            "endElement(body)",
            "endElement(html)",
            "endDocument",
        ]
    );
}

#[test]
fn meta_charset_is_found_case_insensitively() {
    let html = "<html><head>\
                <meta HTTP-EQUIV=Content-Type content=\"text/html;Charset=utf-8\">\
                </head><body>π</body></html>";
    let recorder = scan_bytes(html.as_bytes().to_vec());
    assert_eq!(recorder.character_data(), "π");
}

#[test]
fn meta_without_charset_does_not_replay() {
    let html = "<html><head>\
                <meta http-equiv=\"content-type\" content=\"text/html\">\
                </head><body>x</body></html>";
    let recorder = scan_bytes(html.as_bytes().to_vec());
    let starts = recorder
        .events()
        .iter()
        .filter(|e| e.starts_with("startElement(meta"))
        .count();
    assert_eq!(starts, 1);
    assert_eq!(recorder.character_data(), "x");
}

#[test]
fn an_unknown_meta_charset_reports_and_gives_up_buffering() {
    let html = "<html><head>\
                <meta http-equiv=\"content-type\" content=\"text/html;charset=x-bogus\">\
                </head><body>y</body></html>";
    let recorder = scan_bytes_with(reporting(), html.as_bytes().to_vec());
    assert_eq!(
        recorder.diagnostics(),
        vec![
            "warning HTML1000",
            "error HTML1001",
            "error HTML1010",
        ]
    );
    // The scan continues under the original decoding.
    assert_eq!(recorder.character_data(), "y");
    assert_eq!(recorder.events().last().unwrap(), "endDocument");
}

#[test]
fn replayed_events_are_not_duplicated() {
    let html = "<html><head><title>T</title>\
                <meta http-equiv=\"content-type\" content=\"text/html;charset=UTF-8\">\
                </head><body>z</body></html>";
    let recorder = scan_bytes(html.as_bytes().to_vec());
    let events = recorder.events();
    for needle in ["startElement(html", "startElement(title", "startElement(meta"] {
        let count = events.iter().filter(|e| e.starts_with(needle)).count();
        assert_eq!(count, 1, "{needle} duplicated in {events:?}");
    }
    // Title text is delivered exactly once despite being scanned twice.
    assert_eq!(recorder.character_data(), "Tz");
}
