use docmark_core::config::{DispatcherConfig, Profile};
use docmark_core::error::DocmarkError;
use docmark_core::extraction::generic::CommandConverter;
use docmark_core::extraction::pdftotext::PdftotextBackend;
use docmark_core::FormatTag;

pub fn run() -> Result<(), DocmarkError> {
    println!("Accepted file types:\n");
    for profile in [Profile::Native, Profile::Generic] {
        let marker = if profile == Profile::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {profile}{marker}");
        for ext in profile.accepted_extensions() {
            println!("    .{:<6} {}", ext, FormatTag::from_extension(ext));
        }
        println!();
    }

    let config = DispatcherConfig::default();
    let converter = CommandConverter::new(config.converter.program, config.converter.args);

    println!("Backends:\n");
    println!("  {:<12} built in", "lopdf");
    println!("  {:<12} {}", "pdftotext", availability(PdftotextBackend::is_available()));
    println!(
        "  {:<12} {}",
        converter.program(),
        availability(converter.is_available())
    );

    Ok(())
}

fn availability(found: bool) -> &'static str {
    if found {
        "available"
    } else {
        "not found on PATH"
    }
}
