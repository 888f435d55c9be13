//! Example of opening a legacy Hebrew source and saving it back

use free_bidi::{reverse_transform, Decoder, Diagnostic, EncodingProfile};

fn main() -> anyhow::Result<()> {
    println!("=== Legacy Code Page Round Trip ===\n");

    // ISO-8859-8 bytes: a COBOL DISPLAY with a Hebrew literal
    let original: &[u8] = b"       DISPLAY '\xF9\xEC\xE5\xED \xF2\xE5\xEC\xED' UPON CONSOLE.\n";

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let decoder = Decoder::with_candidates(vec![
        EncodingProfile::default_profile(),
        EncodingProfile::for_label("windows-1255").ok_or_else(|| anyhow::anyhow!("missing windows-1255"))?,
    ]);
    let decoded = decoder.decode(original, &mut diagnostics)?;

    println!("Decoded with {} ({} mark(s)):", decoded.profile, decoded.text.mark_count());
    println!("---");
    print!("{}", decoded.text);
    println!("---");

    let saved = reverse_transform(&decoded.text, &decoded.profile)?;
    assert_eq!(saved, original);
    println!("\nRound-trip verification passed!");

    // Plain ASCII is left alone
    match decoder.decode(b"       STOP RUN.\n", &mut diagnostics) {
        Ok(_) => println!("Unexpectedly transformed plain text"),
        Err(reason) => println!("\nPlain file skipped: {}", reason),
    }

    for diagnostic in &diagnostics {
        println!("  diagnostic: {}", diagnostic);
    }

    Ok(())
}
