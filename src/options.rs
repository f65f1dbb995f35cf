//! Conversion options configuration.

/// What to do when a file cannot be converted cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the problem and move on to the next step or file
    #[default]
    Continue,
    /// Stop at the first problem and return it
    FailFast,
}

/// Options for converting survey CSV files.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Text the header line starts with
    pub header_marker: String,

    /// Field delimiter of the input files
    pub delimiter: u8,

    /// Name given to the trailing column by the header shift
    pub placeholder_column: String,

    /// Name of the output directory created next to each input
    pub output_dir_name: String,

    /// Worksheet name in the produced workbook
    pub sheet_name: String,

    /// Behavior on warnings and per-file failures
    pub failure_policy: FailurePolicy,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            header_marker: "ID".to_string(),
            delimiter: b',',
            placeholder_column: "temp".to_string(),
            output_dir_name: "out".to_string(),
            sheet_name: "Sheet1".to_string(),
            failure_policy: FailurePolicy::Continue,
        }
    }
}

impl ConvertOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header marker.
    pub fn with_header_marker(mut self, marker: impl Into<String>) -> Self {
        self.header_marker = marker.into();
        self
    }

    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the placeholder column name.
    pub fn with_placeholder_column(mut self, name: impl Into<String>) -> Self {
        self.placeholder_column = name.into();
        self
    }

    /// Set the output directory name.
    pub fn with_output_dir_name(mut self, name: impl Into<String>) -> Self {
        self.output_dir_name = name.into();
        self
    }

    /// Set the worksheet name.
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Shorthand for selecting [`FailurePolicy::FailFast`].
    pub fn fail_fast(self) -> Self {
        self.with_failure_policy(FailurePolicy::FailFast)
    }
}
