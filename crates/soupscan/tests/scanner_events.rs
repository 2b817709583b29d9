//! Golden event-sequence tests driven through the public API.

use soupscan::{
    HtmlScanner, InputSource, PROPERTY_NAMES_ATTRS, PROPERTY_NAMES_ELEMS, ScannerConfig,
};
use soupscan_test_support::Recorder;

fn scan_with(config: ScannerConfig, input: &str) -> Recorder {
    let recorder = Recorder::new();
    let mut scanner = HtmlScanner::with_config(config);
    scanner.set_document_handler(Box::new(recorder.clone()));
    scanner.set_error_reporter(Box::new(recorder.clone()));
    scanner
        .set_input_source(InputSource::from_text(input))
        .unwrap();
    assert!(!scanner.scan_document(true).unwrap());
    recorder
}

fn scan(input: &str) -> Recorder {
    scan_with(ScannerConfig::default(), input)
}

fn reporting() -> ScannerConfig {
    ScannerConfig {
        report_errors: true,
        ..ScannerConfig::default()
    }
}

#[test]
fn nested_elements_with_text_and_comment() {
    let recorder = scan("<html><body><p>a</p><!-- note --></body></html>");
    assert_eq!(
        recorder.events(),
        vec![
            "startDocument(Windows-1252)",
            "startElement(html,[])",
            "startElement(body,[])",
            "startElement(p,[])",
            "characters(\"a\")",
            "endElement(p)",
            "comment(\" note \")",
            "endElement(body)",
            "endElement(html)",
            "endDocument",
        ]
    );
}

#[test]
fn every_input_is_bracketed_by_document_events() {
    // Pathological inputs still produce exactly one startDocument and one
    // endDocument and never abort.
    let inputs = [
        "",
        "x",
        "<",
        "<!",
        "<!-",
        "<!--",
        "&",
        "&#",
        "</p>",
        "</>",
        "<p",
        "<p attr",
        "<p attr=",
        "<p attr='x",
        "<script>open",
        "<<<>>>",
        "\r\n\r\r\n",
    ];
    for input in inputs {
        let recorder = scan_with(reporting(), input);
        let events = recorder.events();
        assert_eq!(
            events.first().map(String::as_str),
            Some("startDocument(Windows-1252)"),
            "input {input:?}"
        );
        assert_eq!(
            events.last().map(String::as_str),
            Some("endDocument"),
            "input {input:?}"
        );
        let starts = events.iter().filter(|e| e.starts_with("startDocument")).count();
        let ends = events.iter().filter(|e| e.as_str() == "endDocument").count();
        assert_eq!((starts, ends), (1, 1), "input {input:?}");
    }
}

#[test]
fn character_data_never_contains_carriage_returns() {
    let inputs = [
        "a\rb",
        "a\r\nb",
        "a\n\rb",
        "a\r\rb",
        "pre<script>x\r\ny\rz\r\rw</script>post",
        "<!--\r\n\r-->t",
    ];
    for input in inputs {
        let recorder = scan(input);
        assert!(
            !recorder.character_data().contains('\r'),
            "CR leaked for {input:?}"
        );
    }
}

#[test]
fn name_properties_are_applied_through_the_config_api() {
    let mut config = ScannerConfig::default();
    config.set_property(PROPERTY_NAMES_ELEMS, "upper").unwrap();
    config.set_property(PROPERTY_NAMES_ATTRS, "lower").unwrap();
    let recorder = scan_with(config, "<A B=c D=\"e&amp;f\">");
    assert_eq!(
        recorder.events()[1],
        "startElement(A,[b=\"c\",d=\"e&f\"])"
    );
}

#[test]
fn lowercased_element_names_apply_everywhere() {
    let mut config = ScannerConfig::default();
    config.set_property(PROPERTY_NAMES_ELEMS, "lower").unwrap();
    let recorder = scan_with(config, "<DIV><Span>x</Span></DIV>");
    let events = recorder.events();
    for event in &events {
        if let Some(name) = event
            .strip_prefix("startElement(")
            .or_else(|| event.strip_prefix("endElement("))
        {
            let name = name.split([',', ')']).next().unwrap();
            assert_eq!(name, name.to_ascii_lowercase(), "in {event}");
        }
    }
    assert_eq!(events.len(), 7);
}

#[test]
fn locations_are_attached_to_every_event_when_enabled() {
    let config = ScannerConfig {
        augmentations: true,
        ..ScannerConfig::default()
    };
    let recorder = Recorder::with_locations();
    let mut scanner = HtmlScanner::with_config(config);
    scanner.set_document_handler(Box::new(recorder.clone()));
    scanner
        .set_input_source(InputSource::from_text("<p>hi</p>"))
        .unwrap();
    scanner.scan_document(true).unwrap();
    assert_eq!(
        recorder.events(),
        vec![
            "startDocument(Windows-1252) @1,1..1,1",
            "startElement(p,[]) @1,1..1,4",
            "characters(\"hi\") @1,4..1,6",
            "endElement(p) @1,6..1,10",
            "endDocument @1,10..1,10",
        ]
    );
}

#[test]
fn suspended_scans_replay_the_same_events() {
    let inputs = [
        "<html><head><title>t</title></head><body>a&amp;b<!--c--></body></html>",
        "plain text only",
        "<ul><li>1<li>2</ul>",
        "<script>a<b</script>tail",
    ];
    for input in inputs {
        let whole = scan(input).events();

        let recorder = Recorder::new();
        let mut scanner = HtmlScanner::new();
        scanner.set_document_handler(Box::new(recorder.clone()));
        scanner
            .set_input_source(InputSource::from_text(input))
            .unwrap();
        let mut rounds = 0usize;
        while scanner.scan_document(false).unwrap() {
            rounds += 1;
            assert!(rounds < 10_000, "no termination for {input:?}");
        }
        assert_eq!(recorder.events(), whole, "input {input:?}");
    }
}

#[test]
fn missing_attribute_name_drops_the_tag_but_not_the_element() {
    let recorder = scan_with(reporting(), "<br/>");
    assert_eq!(recorder.events()[1], "startElement(br,[])");
    assert_eq!(recorder.diagnostics(), vec!["error HTML1011"]);
}

#[test]
fn eof_inside_markup_is_reported_and_ends_the_document() {
    for (input, code) in [
        ("<p attr='x", "error HTML1007"),
        ("<p ", "error HTML1007"),
        ("<!--x", "error HTML1007"),
    ] {
        let recorder = scan_with(reporting(), input);
        assert!(
            recorder.diagnostics().contains(&code.to_owned()),
            "{input:?} -> {:?}",
            recorder.diagnostics()
        );
        assert_eq!(recorder.events().last().unwrap(), "endDocument");
    }
}
