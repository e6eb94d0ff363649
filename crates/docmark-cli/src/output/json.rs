use docmark_core::error::DocmarkError;
use docmark_core::ExtractionResult;

pub fn print(result: &ExtractionResult) -> Result<(), DocmarkError> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}
