//! Example of keeping a buffer marked while it is being edited

use free_bidi::{Decoder, Diagnostic, Document, EditDelta, MarkEdit};

fn show(label: &str, doc: &Document) {
    println!("{:<24} {:?}", label, doc.text());
}

fn main() -> anyhow::Result<()> {
    println!("=== Edit-Time Marking ===\n");

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut doc = Document::open(
        "PAYROLL.cob",
        b"       MOVE '\xF9\xEC\xE5\xED' TO WS-GREETING.\n",
        &Decoder::default(),
        &mut diagnostics,
    )?;
    show("opened:", &doc);

    // Paste two Hebrew words separated by ASCII: each run gets its own mark
    let point = doc.text().find("TO").unwrap_or(0);
    let edits = doc.apply_edit(&EditDelta::new(point, "\u{05D0}\u{05D1} OR \u{05D2}\u{05D3} "))?;
    show("after paste:", &doc);
    for edit in &edits {
        match edit {
            MarkEdit::Insert { offset } => println!("  + mark at {}", offset),
            MarkEdit::Remove { offset } => println!("  - mark at {}", offset),
        }
    }

    // Typing inside an existing run needs no new mark
    let point = doc.text().find('\u{05D1}').unwrap_or(0);
    let edits = doc.apply_edit(&EditDelta::new(point, "\u{05D4}"))?;
    show("typed inside run:", &doc);
    println!("  {} edit(s)", edits.len());

    // Saving produces legacy bytes with every mark stripped
    let bytes = doc.save(&mut diagnostics)?;
    println!("\nSaved {} bytes, state: {:?}", bytes.len(), doc.state());

    // A character the code page lacks blocks the save
    doc.apply_edit(&EditDelta::new(0, "\u{00E9}"))?;
    if let Err(e) = doc.save(&mut diagnostics) {
        println!("Save refused: {}", e);
    }

    for diagnostic in &diagnostics {
        println!("  diagnostic: {}", diagnostic);
    }

    Ok(())
}
