//! Configuration for the order tool.
//!
//! Every knob lives in [`ToolConfig`], built through [`ToolConfigBuilder`].
//! The defaults reproduce the deployed setup: a `mapping_table.xlsx` beside
//! the executable, `YY`-prefixed drawing-bearing codes, a `待打印` staging
//! folder inside the drawing library, and `PCS` as the unit marker in the
//! price/quantity/unit column.

use crate::error::FactoryOrderError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the catalog workbook expected beside the executable.
pub const CATALOG_FILE_NAME: &str = "mapping_table.xlsx";

/// Leading code token on the first line of the identification cell.
pub const DEFAULT_CODE_PATTERN: &str = r"^([A-Z]+\d+)\s*(.*)$";

static DEFAULT_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_CODE_PATTERN).unwrap());

/// Configuration shared by every core operation.
///
/// Built via [`ToolConfig::builder()`] or [`ToolConfig::default()`].
///
/// # Example
/// ```rust
/// use factory_order::{QuantityPolicy, ToolConfig};
///
/// let config = ToolConfig::builder()
///     .catalog_path("/srv/orders/mapping_table.xlsx")
///     .quantity_policy(QuantityPolicy::SafetyMargin(2.0))
///     .build()
///     .unwrap();
/// assert_eq!(config.drawing_prefix, "YY");
/// ```
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Catalog workbook. Default: `mapping_table.xlsx` beside the executable.
    pub catalog_path: PathBuf,

    /// Which catalog layout to read. Default: [`CatalogSchema::Auto`].
    pub catalog_schema: CatalogSchema,

    /// Marker and column offsets for the multi-sheet catalog layout.
    pub sheet_layout: SheetLayout,

    /// Unit-of-measure tokens that identify the price/quantity/unit column.
    /// Matched case-insensitively as substrings. Default: `["PCS"]`.
    pub unit_tokens: Vec<String>,

    /// Pattern for the first line of the identification cell; group 1 is the
    /// customer code, group 2 the specification.
    pub code_pattern: Regex,

    /// Quantity adjustment applied during reconciliation. Default: pass-through.
    pub quantity_policy: QuantityPolicy,

    /// Customer codes starting with this prefix carry drawings. Default: `YY`.
    pub drawing_prefix: String,

    /// Staging folder created inside the drawing directory. Default: `待打印`.
    pub staging_folder: String,

    /// PDF user password for encrypted order PDFs.
    pub password: Option<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            catalog_schema: CatalogSchema::default(),
            sheet_layout: SheetLayout::default(),
            unit_tokens: vec!["PCS".to_string()],
            code_pattern: DEFAULT_CODE_RE.clone(),
            quantity_policy: QuantityPolicy::default(),
            drawing_prefix: "YY".to_string(),
            staging_folder: "待打印".to_string(),
            password: None,
        }
    }
}

impl ToolConfig {
    /// Create a new builder for `ToolConfig`.
    pub fn builder() -> ToolConfigBuilder {
        ToolConfigBuilder {
            config: Self::default(),
            code_pattern: None,
        }
    }

    /// Staging directory used for a given drawing library.
    pub fn staging_dir(&self, drawing_dir: &Path) -> PathBuf {
        drawing_dir.join(&self.staging_folder)
    }
}

/// `mapping_table.xlsx` in the executable's directory, or the working
/// directory when the executable path is unavailable.
pub fn default_catalog_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CATALOG_FILE_NAME)
}

/// Builder for [`ToolConfig`].
#[derive(Debug)]
pub struct ToolConfigBuilder {
    config: ToolConfig,
    code_pattern: Option<String>,
}

impl ToolConfigBuilder {
    pub fn catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.catalog_path = path.into();
        self
    }

    pub fn catalog_schema(mut self, schema: CatalogSchema) -> Self {
        self.config.catalog_schema = schema;
        self
    }

    pub fn sheet_layout(mut self, layout: SheetLayout) -> Self {
        self.config.sheet_layout = layout;
        self
    }

    pub fn unit_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.unit_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Override the identification-line pattern. Validated in [`Self::build`].
    pub fn code_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.code_pattern = Some(pattern.into());
        self
    }

    pub fn quantity_policy(mut self, policy: QuantityPolicy) -> Self {
        self.config.quantity_policy = policy;
        self
    }

    pub fn drawing_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.drawing_prefix = prefix.into();
        self
    }

    pub fn staging_folder(mut self, name: impl Into<String>) -> Self {
        self.config.staging_folder = name.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ToolConfig, FactoryOrderError> {
        if let Some(pattern) = self.code_pattern.take() {
            let re = Regex::new(&pattern).map_err(|e| {
                FactoryOrderError::InvalidConfig(format!("code pattern '{}': {}", pattern, e))
            })?;
            if re.captures_len() < 3 {
                return Err(FactoryOrderError::InvalidConfig(format!(
                    "code pattern '{}' needs two capture groups (code, specification)",
                    pattern
                )));
            }
            self.config.code_pattern = re;
        }

        let c = &self.config;
        if c.drawing_prefix.trim().is_empty() {
            return Err(FactoryOrderError::InvalidConfig(
                "drawing prefix must not be empty".into(),
            ));
        }
        if c.unit_tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(FactoryOrderError::InvalidConfig(
                "at least one unit token is required".into(),
            ));
        }
        if c.staging_folder.trim().is_empty()
            || c.staging_folder.contains(['/', '\\'])
            || c.staging_folder == ".."
        {
            return Err(FactoryOrderError::InvalidConfig(format!(
                "staging folder must be a plain folder name, got '{}'",
                c.staging_folder
            )));
        }
        if let QuantityPolicy::SafetyMargin(m) = c.quantity_policy {
            if !m.is_finite() {
                return Err(FactoryOrderError::InvalidConfig(
                    "safety margin must be a finite number".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Catalog workbook layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSchema {
    /// Single-sheet when the first row names the key columns, else multi-sheet.
    #[default]
    Auto,
    /// One sheet, header in row 1, columns located by header text.
    SingleSheet,
    /// Every sheet scanned for a marker row; fixed column offsets below it.
    MultiSheet,
}

/// Fixed layout of the multi-sheet catalog (0-based column offsets).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Substring that identifies the header row on each sheet.
    pub marker: String,
    pub customer_col: usize,
    pub factory_col: usize,
    pub name_col: usize,
    pub unit_col: Option<usize>,
    pub route_col: Option<usize>,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            marker: "产品编号".to_string(),
            customer_col: 0,
            factory_col: 1,
            name_col: 2,
            unit_col: Some(3),
            route_col: None,
        }
    }
}

/// How the purchase quantity is carried into the export.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityPolicy {
    /// Quantity exported exactly as printed on the order.
    #[default]
    PassThrough,
    /// Parsed quantity plus a constant margin; unparseable values pass through.
    SafetyMargin(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let c = ToolConfig::default();
        assert_eq!(c.drawing_prefix, "YY");
        assert_eq!(c.staging_folder, "待打印");
        assert_eq!(c.unit_tokens, vec!["PCS"]);
        assert!(c.catalog_path.ends_with(CATALOG_FILE_NAME));
        assert_eq!(c.quantity_policy, QuantityPolicy::PassThrough);
    }

    #[test]
    fn staging_dir_is_inside_drawing_dir() {
        let c = ToolConfig::default();
        assert_eq!(
            c.staging_dir(Path::new("/data/drawings")),
            PathBuf::from("/data/drawings/待打印")
        );
    }

    #[test]
    fn rejects_bad_code_pattern() {
        let err = ToolConfig::builder().code_pattern("([A-Z").build().unwrap_err();
        assert!(matches!(err, FactoryOrderError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_code_pattern_without_groups() {
        let err = ToolConfig::builder().code_pattern(r"^YY\d+").build().unwrap_err();
        assert!(err.to_string().contains("capture groups"));
    }

    #[test]
    fn rejects_nested_staging_folder() {
        assert!(ToolConfig::builder().staging_folder("a/b").build().is_err());
        assert!(ToolConfig::builder().staging_folder("  ").build().is_err());
    }

    #[test]
    fn rejects_empty_prefix() {
        assert!(ToolConfig::builder().drawing_prefix("").build().is_err());
    }

    #[test]
    fn accepts_custom_code_pattern() {
        let c = ToolConfig::builder()
            .code_pattern(r"^(F\d+)\s*(.*)$")
            .build()
            .unwrap();
        let caps = c.code_pattern.captures("F1234 spec").unwrap();
        assert_eq!(&caps[1], "F1234");
    }
}
