use docmark_core::ExtractionResult;
use std::path::Path;

/// Human-readable byte count: `512 B`, `1.5 KB`, `50.0 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

pub fn print_preview(result: &ExtractionResult, max_chars: usize) {
    let preview = result.preview(max_chars);
    let total = result.text().map(|t| t.chars().count()).unwrap_or(0);

    if total > max_chars {
        println!("=== Preview (first {max_chars} of {total} characters) ===\n");
    } else {
        println!("=== Preview ({total} characters) ===\n");
    }
    println!("{}", preview.trim_end());
    println!();
}

/// Input and output size side by side.
pub fn print_sizes(input: &Path, input_len: u64, output: &Path, output_len: u64) {
    let input_name = file_name(input);
    let output_name = file_name(output);

    let width = input_name.len().max(output_name.len()).max(4);
    println!("  {:<6}  {:<width$}  {:>10}", "", "File", "Size");
    println!(
        "  {:<6}  {:<width$}  {:>10}",
        "Input",
        input_name,
        format_bytes(input_len)
    );
    println!(
        "  {:<6}  {:<width$}  {:>10}",
        "Output",
        output_name,
        format_bytes(output_len)
    );
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
