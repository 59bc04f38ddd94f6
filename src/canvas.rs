//! The in-memory canvas model for a modern page: sections → columns →
//! controls, with the position bookkeeping the server's canvas renderer
//! depends on.
//!
//! The tree is owned top-down; position fields are stamped on insertion
//! and rewritten by [`reindex`] after any structural mutation so they
//! always form a dense, gap-free, 1-based sequence matching array
//! order.

use crate::error::{SharePointError, SharePointResult};
use crate::types::{
    CanvasColumnData, CanvasColumnFactor, CanvasPosition, ClientsidePageComponent,
    ClientsideTextData, ClientsideWebPartData, ControlEmphasis, WebPartData,
};

/// Next insertion order for a sequence of existing orders:
/// `max + 1`, or 1 when the sequence is empty.
pub fn get_next_order<I>(orders: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    orders.into_iter().max().map(|m| m + 1).unwrap_or(1)
}

/// Rewrite every section / column / control order to its 1-based array
/// position, stamping subordinate position fields (zone, section,
/// control and layout indexes plus the section factor) along the way.
pub fn reindex(sections: &mut [CanvasSection]) {
    for (i, section) in sections.iter_mut().enumerate() {
        section.order = (i + 1) as i32;
        for (j, column) in section.columns.iter_mut().enumerate() {
            column.data.position.zone_index = section.order;
            column.data.position.section_index = (j + 1) as i32;
            column.data.position.layout_index = section.layout_index;

            let zone = column.data.position.zone_index;
            let section_index = column.data.position.section_index;
            let layout = column.data.position.layout_index;
            let factor = column.data.position.section_factor;

            for (k, control) in column.controls.iter_mut().enumerate() {
                let pos = control.position_mut();
                pos.zone_index = zone;
                pos.section_index = section_index;
                pos.layout_index = layout;
                pos.control_index = Some((k + 1) as i32);
                pos.section_factor = factor;
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Controls
// ═══════════════════════════════════════════════════════════════════════

/// A rich text control (`controlType` 4).
#[derive(Debug, Clone)]
pub struct ClientsideText {
    data: ClientsideTextData,
}

impl ClientsideText {
    /// Create a new text control. The id is generated once and never
    /// regenerated.
    pub fn new(text: impl Into<String>) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let mut s = Self {
            data: ClientsideTextData {
                id: id.clone(),
                anchor_component_id: id,
                ..ClientsideTextData::default()
            },
        };
        s.set_text(text);
        s
    }

    /// Rehydrate from persisted wire data; a missing id gets one
    /// assigned (it will then remain stable).
    pub fn from_data(mut data: ClientsideTextData) -> Self {
        if data.id.is_empty() {
            let id = uuid::Uuid::new_v4().to_string();
            data.anchor_component_id = id.clone();
            data.id = id;
        }
        Self { data }
    }

    pub fn text(&self) -> &str {
        &self.data.inner_html
    }

    /// Set the text; bare text is wrapped in a `<p>` element as the
    /// editor expects.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.data.inner_html = if text.starts_with("<p>") {
            text
        } else {
            format!("<p>{}</p>", text)
        };
    }

    pub fn data(&self) -> &ClientsideTextData {
        &self.data
    }
}

/// A web part control (`controlType` 3).
#[derive(Debug, Clone)]
pub struct ClientsideWebpart {
    data: ClientsideWebPartData,
}

impl ClientsideWebpart {
    pub fn from_data(data: ClientsideWebPartData) -> Self {
        Self { data }
    }

    /// Build a web part from a component definition retrieved via
    /// `_api/web/GetClientSideWebParts`, importing the first
    /// preconfigured entry of its manifest.
    pub fn from_component_def(component: &ClientsidePageComponent) -> SharePointResult<Self> {
        let manifest: serde_json::Value = serde_json::from_str(&component.manifest)?;
        let entry = manifest["preconfiguredEntries"]
            .get(0)
            .ok_or_else(|| {
                SharePointError::invalid(format!(
                    "Component {} has no preconfigured entries",
                    component.id
                ))
            })?;

        let id = uuid::Uuid::new_v4().to_string();
        let component_id = component
            .id
            .trim_start_matches('{')
            .trim_end_matches('}')
            .to_lowercase();

        let data = ClientsideWebPartData {
            id: Some(id.clone()),
            web_part_id: Some(component_id.clone()),
            web_part_data: Some(WebPartData {
                id: component_id,
                instance_id: id,
                title: entry["title"]["default"].as_str().unwrap_or_default().into(),
                description: entry["description"]["default"]
                    .as_str()
                    .unwrap_or_default()
                    .into(),
                server_processed_content: None,
                data_version: "1.0".into(),
                properties: entry["properties"].clone(),
            }),
            ..ClientsideWebPartData::default()
        };

        Ok(Self { data })
    }

    pub fn title(&self) -> &str {
        self.data
            .web_part_data
            .as_ref()
            .map(|d| d.title.as_str())
            .unwrap_or_default()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        if let Some(d) = self.data.web_part_data.as_mut() {
            d.title = title.into();
        }
    }

    pub fn description(&self) -> &str {
        self.data
            .web_part_data
            .as_ref()
            .map(|d| d.description.as_str())
            .unwrap_or_default()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        if let Some(d) = self.data.web_part_data.as_mut() {
            d.description = description.into();
        }
    }

    pub fn height(&self) -> i64 {
        self.data.reserved_height
    }

    pub fn set_height(&mut self, height: i64) {
        self.data.reserved_height = height;
    }

    pub fn width(&self) -> i64 {
        self.data.reserved_width
    }

    pub fn set_width(&mut self, width: i64) {
        self.data.reserved_width = width;
    }

    /// Merge the supplied properties into the web part instance
    /// properties.
    pub fn set_properties(&mut self, properties: serde_json::Value) {
        let Some(d) = self.data.web_part_data.as_mut() else {
            return;
        };
        match (&mut d.properties, properties) {
            (serde_json::Value::Object(existing), serde_json::Value::Object(new)) => {
                for (k, v) in new {
                    existing.insert(k, v);
                }
            }
            (slot, new) => *slot = new,
        }
    }

    pub fn properties(&self) -> Option<&serde_json::Value> {
        self.data.web_part_data.as_ref().map(|d| &d.properties)
    }

    pub fn data(&self) -> &ClientsideWebPartData {
        &self.data
    }
}

/// A placed content unit within a column.
#[derive(Debug, Clone)]
pub enum ColumnControl {
    Text(ClientsideText),
    WebPart(ClientsideWebpart),
}

impl ColumnControl {
    /// The stable instance id.
    pub fn id(&self) -> &str {
        match self {
            Self::Text(t) => &t.data.id,
            Self::WebPart(w) => w.data.id.as_deref().unwrap_or_default(),
        }
    }

    /// 1-based order within the owning column.
    pub fn order(&self) -> i32 {
        self.position().control_index.unwrap_or(1)
    }

    pub fn position(&self) -> &CanvasPosition {
        match self {
            Self::Text(t) => &t.data.position,
            Self::WebPart(w) => &w.data.position,
        }
    }

    pub(crate) fn position_mut(&mut self) -> &mut CanvasPosition {
        match self {
            Self::Text(t) => &mut t.data.position,
            Self::WebPart(w) => &mut w.data.position,
        }
    }

    pub(crate) fn set_emphasis(&mut self, emphasis: ControlEmphasis) {
        match self {
            Self::Text(t) => t.data.emphasis = emphasis,
            Self::WebPart(w) => w.data.emphasis = emphasis,
        }
    }

    pub(crate) fn emphasis_value(&self) -> u8 {
        let emphasis = match self {
            Self::Text(t) => &t.data.emphasis,
            Self::WebPart(w) => &w.data.emphasis,
        };
        emphasis.zone_emphasis.unwrap_or(0)
    }

    /// Serialize the control's wire data.
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::Text(t) => serde_json::to_value(&t.data),
            Self::WebPart(w) => serde_json::to_value(&w.data),
        }
        .unwrap_or(serde_json::Value::Null)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Columns
// ═══════════════════════════════════════════════════════════════════════

/// A vertical slot within a section, with a width factor out of 12.
#[derive(Debug, Clone)]
pub struct CanvasColumn {
    pub(crate) data: CanvasColumnData,
    pub controls: Vec<ColumnControl>,
}

impl CanvasColumn {
    pub fn new(data: CanvasColumnData) -> Self {
        Self {
            data,
            controls: Vec::new(),
        }
    }

    /// 1-based order within the owning section.
    pub fn order(&self) -> i32 {
        self.data.position.section_index
    }

    pub fn factor(&self) -> CanvasColumnFactor {
        self.data.position.section_factor.unwrap_or(12)
    }

    pub fn set_factor(&mut self, factor: CanvasColumnFactor) {
        self.data.position.section_factor = Some(factor);
    }

    pub fn data(&self) -> &CanvasColumnData {
        &self.data
    }

    /// Append a control, stamping its position from this column.
    pub fn add_control(&mut self, mut control: ColumnControl) -> &mut ColumnControl {
        let factor = self.data.position.section_factor;
        let next = get_next_order(self.controls.iter().map(|c| c.order()));
        let pos = control.position_mut();
        pos.section_factor = factor;
        pos.control_index = Some(next);
        pos.zone_index = self.data.position.zone_index;
        pos.section_index = self.data.position.section_index;
        pos.layout_index = self.data.position.layout_index;
        self.controls.push(control);
        self.controls.last_mut().unwrap()
    }

    pub fn get_control(&self, index: usize) -> Option<&ColumnControl> {
        self.controls.get(index)
    }

    /// Remove a control by id, re-indexing the remaining siblings.
    /// Returns false if no control carried that id.
    pub fn remove_control(&mut self, id: &str) -> bool {
        let before = self.controls.len();
        self.controls.retain(|c| c.id() != id);
        if self.controls.len() == before {
            return false;
        }
        for (k, control) in self.controls.iter_mut().enumerate() {
            control.position_mut().control_index = Some((k + 1) as i32);
        }
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Sections
// ═══════════════════════════════════════════════════════════════════════

/// A horizontal band of the canvas. `layout_index` 1 is a normal
/// section; 2 is the page's single vertical section.
#[derive(Debug, Clone)]
pub struct CanvasSection {
    pub order: i32,
    pub layout_index: i32,
    /// Emphasis 0–3; stamped onto every exported control.
    pub emphasis: u8,
    pub columns: Vec<CanvasColumn>,
}

impl CanvasSection {
    pub fn new(order: i32, layout_index: i32) -> Self {
        Self {
            order,
            layout_index,
            emphasis: 0,
            columns: Vec::new(),
        }
    }

    /// Add a new column with the given width factor.
    pub fn add_column(&mut self, factor: CanvasColumnFactor) -> &mut CanvasColumn {
        let data = CanvasColumnData {
            position: CanvasPosition {
                zone_index: self.order,
                section_index: get_next_order(self.columns.iter().map(|c| c.order())),
                control_index: None,
                section_factor: Some(factor),
                layout_index: self.layout_index,
            },
            ..CanvasColumnData::default()
        };
        self.columns.push(CanvasColumn::new(data));
        self.columns.last_mut().unwrap()
    }

    /// The first column, created full-width when the section is empty.
    pub fn default_column(&mut self) -> &mut CanvasColumn {
        if self.columns.is_empty() {
            self.add_column(12);
        }
        &mut self.columns[0]
    }

    /// Add a control to the default column.
    pub fn add_control(&mut self, control: ColumnControl) -> &mut ColumnControl {
        self.default_column().add_control(control)
    }

    /// Remove a column by its 0-based index; the caller is expected to
    /// reindex the page tree afterwards.
    pub fn remove_column(&mut self, index: usize) -> bool {
        if index >= self.columns.len() {
            return false;
        }
        self.columns.remove(index);
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
