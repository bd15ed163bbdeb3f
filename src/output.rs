//! Output types: layout elements and per-run statistics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic type of a detected layout region.
///
/// Serialises to the exact strings the response schema constrains the model
/// to: `"Table"`, `"Figure"`, `"Image"`, `"Text-block"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Table,
    Figure,
    Image,
    #[serde(rename = "Text-block")]
    TextBlock,
}

impl ElementType {
    /// Every variant, in schema order.
    pub const ALL: [ElementType; 4] = [
        ElementType::Table,
        ElementType::Figure,
        ElementType::Image,
        ElementType::TextBlock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Table => "Table",
            ElementType::Figure => "Figure",
            ElementType::Image => "Image",
            ElementType::TextBlock => "Text-block",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown element type '{s}'"))
    }
}

/// One detected region on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutElement {
    pub element_type: ElementType,
    /// Free-text description produced by the model.
    pub summary: String,
    /// Zero-based page index.
    pub page_number: usize,
}

/// The metadata view of a [`LayoutElement`], as handed to downstream indexers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMetadata {
    pub page_number: usize,
    pub element_type: String,
}

impl LayoutElement {
    pub fn metadata(&self) -> ElementMetadata {
        ElementMetadata {
            page_number: self.page_number,
            element_type: self.element_type.as_str().to_string(),
        }
    }
}

/// Per-page outcome of the inference stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSummary {
    /// Zero-based page index.
    pub page_number: usize,
    pub element_count: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub duration_ms: u64,
}

/// Aggregate statistics for one document run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub total_pages: usize,
    pub total_elements: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub render_duration_ms: u64,
    pub inference_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Result of a complete extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Elements in page order, then model order within a page.
    pub elements: Vec<LayoutElement>,
    /// One entry per page, in page order.
    pub pages: Vec<PageSummary>,
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    /// Elements detected on one (zero-based) page.
    pub fn elements_on_page(&self, page_number: usize) -> impl Iterator<Item = &LayoutElement> {
        self.elements
            .iter()
            .filter(move |e| e.page_number == page_number)
    }

    /// Elements of a given type, across all pages.
    pub fn elements_of_type(&self, ty: ElementType) -> impl Iterator<Item = &LayoutElement> {
        self.elements.iter().filter(move |e| e.element_type == ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_block_uses_hyphenated_name() {
        let json = serde_json::to_string(&ElementType::TextBlock).unwrap();
        assert_eq!(json, "\"Text-block\"");
        let back: ElementType = serde_json::from_str("\"Text-block\"").unwrap();
        assert_eq!(back, ElementType::TextBlock);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_str::<ElementType>("\"Chart\"").is_err());
        assert!("TextBlock".parse::<ElementType>().is_err());
        assert_eq!("Figure".parse::<ElementType>().unwrap(), ElementType::Figure);
    }

    #[test]
    fn metadata_view() {
        let e = LayoutElement {
            element_type: ElementType::Table,
            summary: "Revenue table".into(),
            page_number: 3,
        };
        let m = e.metadata();
        assert_eq!(m.page_number, 3);
        assert_eq!(m.element_type, "Table");
    }

    #[test]
    fn filters_by_page_and_type() {
        let el = |t, p| LayoutElement {
            element_type: t,
            summary: String::new(),
            page_number: p,
        };
        let out = ExtractionOutput {
            elements: vec![
                el(ElementType::Table, 0),
                el(ElementType::TextBlock, 0),
                el(ElementType::Table, 1),
            ],
            pages: vec![],
            stats: ExtractionStats::default(),
        };
        assert_eq!(out.elements_on_page(0).count(), 2);
        assert_eq!(out.elements_of_type(ElementType::Table).count(), 2);
        assert_eq!(out.elements_on_page(5).count(), 0);
    }
}
