//! Precomputed model diagnostics shown next to a prediction.
//!
//! Purely decorative: files that are absent are simply not listed.

use std::path::{Path, PathBuf};

const DIAGNOSTICS: [(&str, &str); 2] = [
    ("shap_summary.png", "Feature Importance (SHAP)"),
    ("actual_vs_predicted.png", "Model Accuracy (Test Set)"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub caption: &'static str,
    pub path: PathBuf,
}

/// Diagnostics present under `outputs_dir`.
pub fn find_diagnostics(outputs_dir: &Path) -> Vec<Diagnostic> {
    DIAGNOSTICS
        .iter()
        .map(|&(file, caption)| Diagnostic {
            caption,
            path: outputs_dir.join(file),
        })
        .filter(|d| d.path.is_file())
        .collect()
}
