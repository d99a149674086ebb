use super::{nice_bool, subtitle_lines, title_lines, TITLE_WIDTH};

#[test]
fn test_format_title_lines() {
    let lines = title_lines("Summary");
    let widths = lines.iter().map(|l| l.chars().count()).collect::<Vec<_>>();
    assert_eq!(widths, vec![TITLE_WIDTH + 6; 3]);
    assert!(lines[1].contains(" Summary "));

    let long = "x".repeat(TITLE_WIDTH + 10);
    let lines = title_lines(&long);
    assert_eq!(lines[0].chars().count(), TITLE_WIDTH + 16);
    assert_eq!(lines[1], format!("│§ {long} §│"));
}

#[test]
fn test_format_subtitle_lines() {
    assert_eq!(
        subtitle_lines("Basis set"),
        ["Basis set".to_string(), "═════════".to_string()]
    );
    assert_eq!(nice_bool(true), "yes");
    assert_eq!(nice_bool(false), "no");
}
