use serde::Deserialize;

/// Configuration for the external e-book converter
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Run the converter after the HTML is written (default: true)
    pub enabled: bool,

    /// Converter executable (default: calibre's `ebook-convert`)
    pub program: String,

    /// Target formats, used as file extensions
    pub formats: Vec<String>,

    /// Base name of the converted files
    pub output_name: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "ebook-convert".to_string(),
            formats: vec![
                // Kindle
                "azw3".to_string(),
                // Reflowable
                "epub".to_string(),
                // Print
                "pdf".to_string(),
            ],
            output_name: "book".to_string(),
        }
    }
}
