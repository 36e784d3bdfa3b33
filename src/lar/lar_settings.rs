#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LarSettings {
    /// Run a floating point pass first and seed the exact pass with its outcome.
    pub use_approximate_pass: bool,
    pub max_approximate_iterations: usize,
    /// None means the exact pass runs until it decides.
    pub max_exact_iterations: Option<usize>,
}

impl Default for LarSettings {
    fn default() -> Self {
        Self {
            use_approximate_pass: true,
            max_approximate_iterations: 10_000,
            max_exact_iterations: None,
        }
    }
}
