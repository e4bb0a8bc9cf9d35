//! Example: record a small scripted page session

use fos_dom::Document;
use fos_recorder::{
    FocusType, MouseEventType, PageRecorder, PointerInput, RecorderConfig, SinkError,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Build the page before the recorder attaches
    let mut doc = Document::new("https://example.com/index.html")?;
    let root = doc.root();
    let html = doc.create_element("html");
    let body = doc.create_element("body");
    doc.append_child(root, html)?;
    doc.append_child(html, body)?;

    let sink = |payload: &str| -> Result<(), SinkError> {
        println!("upload: {payload}");
        Ok(())
    };
    let config = RecorderConfig::from_json(r#"{ "idleThresholdMs": 0 }"#)?;
    let mut recorder = PageRecorder::new(&mut doc, sink, config);
    println!("fOS Recorder v{} attached", fos_recorder::VERSION);

    // Script edits
    let input = doc.create_element("input");
    doc.set_attribute(input, "name", "q")?;
    doc.append_child(body, input)?;
    recorder.process_pending(&mut doc);
    recorder.on_load_event(&doc, "DOMContentLoaded");

    // User interaction
    let mut click = PointerInput::at(40.0, 12.0);
    click.target = Some(input);
    click.buttons = 1;
    recorder.track_mouse(MouseEventType::Down, click);
    doc.set_value(input, "hello")?;
    recorder.check_for_property_changes(&doc);
    recorder.track_focus(&doc, FocusType::Out, Some(input), None);
    recorder.track_scroll(0.0, 120.0);

    recorder.on_interval();

    // Same-document navigation, then leave the page
    doc.navigate("#results")?;
    doc.remove_child(body, input)?;
    recorder.disconnect(&mut doc);

    Ok(())
}
