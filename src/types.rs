//! Shared types for the SharePoint modern-page REST integration.
//!
//! Models cover the site configuration, the `SP.Publishing.SitePage`
//! server document, the canvas control wire shapes (`controlType` 0, 3
//! and 4), the title-region layout part, and page comments / likes.
//!
//! Field names and casing match the server JSON exactly; the canvas
//! renderer is strict about them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════
//  Configuration
// ═══════════════════════════════════════════════════════════════════════

/// Configuration for a SharePoint web connection.
///
/// Constructed once by the caller and passed by reference into the
/// client; there is no ambient global configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePointConfig {
    /// Absolute URL of the web all `_api` paths are relative to,
    /// e.g. `https://contoso.sharepoint.com/sites/marketing`.
    pub web_url: String,
    /// Timeout in seconds for HTTP calls.  Default: 60.
    pub timeout_sec: u64,
    /// Maximum automatic retries for throttled / transient failures.
    /// Default: 3.
    pub max_retries: u32,
}

impl Default for SharePointConfig {
    fn default() -> Self {
        Self {
            web_url: String::new(),
            timeout_sec: 60,
            max_retries: 3,
        }
    }
}

impl SharePointConfig {
    pub fn new(web_url: impl Into<String>) -> Self {
        Self {
            web_url: web_url.into(),
            ..Self::default()
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Page document  (SP.Publishing.SitePage)
// ═══════════════════════════════════════════════════════════════════════

/// Page layout types for client side "modern" pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageLayoutType {
    Article,
    Home,
    SingleWebPartAppPage,
    RepostPage,
}

impl Default for PageLayoutType {
    fn default() -> Self {
        Self::Article
    }
}

/// Version bookkeeping returned inside the page document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct VersionInfo {
    pub last_version_created: Option<String>,
    pub last_version_created_by: Option<String>,
}

/// The raw server document for a site page as returned by
/// `_api/sitepages/pages({id})`.
///
/// `CanvasContent1` and `LayoutWebpartsContent` are independently
/// JSON-encoded string fields; see [`crate::pages::ClientsidePage`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PageData {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub absolute_url: Option<String>,
    pub author_byline: Option<Vec<String>>,
    pub banner_image_url: Option<String>,
    pub content_type_id: Option<String>,
    pub description: Option<String>,
    pub does_user_have_edit_permission: Option<bool>,
    pub file_name: Option<String>,
    pub first_published: Option<String>,
    pub is_page_checked_out_to_current_user: Option<bool>,
    pub is_web_welcome_page: Option<bool>,
    pub modified: Option<String>,
    pub page_layout_type: Option<PageLayoutType>,
    pub promoted_state: Option<i64>,
    pub topic_header: Option<String>,
    pub unique_id: Option<String>,
    pub url: Option<String>,
    pub version: Option<String>,
    pub version_info: Option<VersionInfo>,
    pub canvas_content1: Option<String>,
    pub layout_webparts_content: Option<String>,
}

/// Page promotion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotedState {
    /// Regular client side page.
    NotPromoted = 0,
    /// Will be promoted as a news article after publishing.
    PromoteOnPublish = 1,
    /// Promoted as a news article.
    Promoted = 2,
}

// ═══════════════════════════════════════════════════════════════════════
//  Canvas control wire shapes
// ═══════════════════════════════════════════════════════════════════════

/// Column width factor out of 12 grid units. Valid values are
/// 0, 2, 4, 6, 8 and 12; the model does not enforce that the factors of
/// a section sum to 12.
pub type CanvasColumnFactor = i32;

fn default_layout_index() -> i32 {
    1
}

fn default_display_mode() -> i32 {
    2
}

/// Positional coordinates persisted per control so the server can
/// reconstruct placement order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasPosition {
    pub zone_index: i32,
    pub section_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_factor: Option<CanvasColumnFactor>,
    #[serde(default = "default_layout_index")]
    pub layout_index: i32,
}

impl Default for CanvasPosition {
    fn default() -> Self {
        Self {
            zone_index: 1,
            section_index: 1,
            control_index: None,
            section_factor: Some(12),
            layout_index: 1,
        }
    }
}

/// Section emphasis wrapper; the server omits the key entirely for the
/// default emphasis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlEmphasis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_emphasis: Option<u8>,
}

impl ControlEmphasis {
    /// Build the wire form for a section emphasis: `{}` for 0 or any
    /// out-of-range value, `{ "zoneEmphasis": n }` for 1–3.
    pub fn from_value(value: u8) -> Self {
        if (1..=3).contains(&value) {
            Self {
                zone_emphasis: Some(value),
            }
        } else {
            Self::default()
        }
    }
}

/// Wire data for an empty-column marker (`controlType` 0, no
/// `pageSettingsSlice` key).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasColumnData {
    pub control_type: i32,
    #[serde(default = "default_display_mode")]
    pub display_mode: i32,
    pub emphasis: ControlEmphasis,
    pub position: CanvasPosition,
}

impl Default for CanvasColumnData {
    fn default() -> Self {
        Self {
            control_type: 0,
            display_mode: 2,
            emphasis: ControlEmphasis::default(),
            position: CanvasPosition::default(),
        }
    }
}

/// Wire data for a rich text control (`controlType` 4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientsideTextData {
    pub control_type: i32,
    pub id: String,
    pub position: CanvasPosition,
    pub emphasis: ControlEmphasis,
    #[serde(default = "default_display_mode")]
    pub display_mode: i32,
    pub anchor_component_id: String,
    pub editor_type: String,
    pub added_from_persisted_data: bool,
    #[serde(rename = "innerHTML")]
    pub inner_html: String,
}

impl Default for ClientsideTextData {
    fn default() -> Self {
        Self {
            control_type: 4,
            id: String::new(),
            position: CanvasPosition {
                control_index: Some(1),
                ..CanvasPosition::default()
            },
            emphasis: ControlEmphasis::default(),
            display_mode: 2,
            anchor_component_id: String::new(),
            editor_type: "CKEditor".into(),
            added_from_persisted_data: false,
            inner_html: String::new(),
        }
    }
}

/// Inner web part instance payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebPartData {
    pub id: String,
    pub instance_id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_processed_content: Option<ServerProcessedContent>,
    pub data_version: String,
    pub properties: serde_json::Value,
}

/// Wire data for a web part control (`controlType` 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientsideWebPartData {
    pub control_type: i32,
    pub id: Option<String>,
    pub position: CanvasPosition,
    pub emphasis: ControlEmphasis,
    #[serde(default = "default_display_mode")]
    pub display_mode: i32,
    pub added_from_persisted_data: bool,
    pub reserved_height: i64,
    pub reserved_width: i64,
    pub web_part_id: Option<String>,
    pub web_part_data: Option<WebPartData>,
}

impl Default for ClientsideWebPartData {
    fn default() -> Self {
        Self {
            control_type: 3,
            id: None,
            position: CanvasPosition {
                control_index: Some(1),
                ..CanvasPosition::default()
            },
            emphasis: ControlEmphasis::default(),
            display_mode: 2,
            added_from_persisted_data: false,
            reserved_height: 500,
            reserved_width: 500,
            web_part_id: None,
            web_part_data: None,
        }
    }
}

/// The `pageSettingsSlice` payload (`controlType` 0 with that key).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageSettings {
    pub is_default_description: bool,
    pub is_default_thumbnail: bool,
    /// Unknown keys are carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            is_default_description: true,
            is_default_thumbnail: true,
            extra: serde_json::Map::new(),
        }
    }
}

/// The page-settings canvas entry; exactly one per page, appended last
/// on export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageSettingsSlice {
    pub control_type: i32,
    pub page_settings_slice: PageSettings,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for PageSettingsSlice {
    fn default() -> Self {
        Self {
            control_type: 0,
            page_settings_slice: PageSettings::default(),
            extra: serde_json::Map::new(),
        }
    }
}

/// A client side web part definition from
/// `_api/web/GetClientSideWebParts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ClientsidePageComponent {
    pub component_type: i32,
    pub id: String,
    pub manifest: String,
    pub manifest_type: i32,
    pub name: String,
    pub status: i32,
}

// ═══════════════════════════════════════════════════════════════════════
//  Layout part  (title region)
// ═══════════════════════════════════════════════════════════════════════

/// Header layout options for the title region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderLayoutType {
    FullWidthImage,
    NoImage,
    ColorBlock,
    CutInShape,
}

/// Header text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlignment {
    Left,
    Center,
}

/// Banner-image identifiers resolved server-side and folded into the
/// layout part before save.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageSourceMetadata {
    pub site_id: String,
    pub web_id: String,
    pub list_id: String,
    pub unique_id: String,
}

/// `customMetadata` inside the layout part's server-processed content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_source: Option<ImageSourceMetadata>,
}

/// Server-processed content maps shared by web parts and the layout
/// part.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerProcessedContent {
    pub html_strings: HashMap<String, String>,
    pub searchable_plain_texts: HashMap<String, String>,
    pub image_sources: HashMap<String, String>,
    pub links: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_metadata: Option<CustomMetadata>,
}

/// An author entry in the layout part.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutPartAuthor {
    pub id: String,
    pub email: String,
    pub upn: String,
    pub name: String,
    pub role: String,
}

/// Properties of the title-region layout part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutPartProperties {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_source_type: Option<i32>,
    pub layout_type: HeaderLayoutType,
    pub text_alignment: TextAlignment,
    pub show_topic_header: bool,
    pub show_publish_date: bool,
    pub topic_header: String,
    pub authors: Vec<LayoutPartAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl Default for LayoutPartProperties {
    fn default() -> Self {
        Self {
            title: String::new(),
            image_source_type: None,
            layout_type: HeaderLayoutType::FullWidthImage,
            text_alignment: TextAlignment::Left,
            show_topic_header: false,
            show_publish_date: false,
            topic_header: String::new(),
            authors: Vec::new(),
            web_id: None,
            site_id: None,
            list_id: None,
            unique_id: None,
            translate_x: None,
            translate_y: None,
            alt_text: None,
        }
    }
}

/// Well-known id of the default title-region layout part.
pub const DEFAULT_LAYOUT_PART_ID: &str = "cbe7b0a9-3504-44dd-a3a3-0e5cacd07788";

/// A single entry of the `LayoutWebpartsContent` array; only the first
/// entry is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutPartsContent {
    pub id: String,
    pub instance_id: String,
    pub title: String,
    pub description: String,
    pub server_processed_content: ServerProcessedContent,
    pub data_version: String,
    pub properties: LayoutPartProperties,
}

impl Default for LayoutPartsContent {
    fn default() -> Self {
        Self {
            id: DEFAULT_LAYOUT_PART_ID.into(),
            instance_id: DEFAULT_LAYOUT_PART_ID.into(),
            title: "Title area".into(),
            description: "Title Region Description".into(),
            server_processed_content: ServerProcessedContent::default(),
            data_version: "1.4".into(),
            properties: LayoutPartProperties::default(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Comments / likes
// ═══════════════════════════════════════════════════════════════════════

/// Author of a page comment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommentAuthorInfo {
    pub email: Option<String>,
    pub id: Option<i64>,
    pub is_active: Option<bool>,
    pub is_external_user: Option<bool>,
    pub is_site_admin: Option<bool>,
    pub job_title: Option<String>,
    pub login_name: Option<String>,
    pub name: Option<String>,
    pub principal_type: Option<i32>,
    pub user_id: Option<serde_json::Value>,
}

/// A page comment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommentInfo {
    pub id: String,
    pub text: String,
    pub author: Option<CommentAuthorInfo>,
    pub created_date: Option<String>,
    pub is_liked_by_user: Option<bool>,
    pub is_reply: Option<bool>,
    pub item_id: Option<i64>,
    pub like_count: Option<i64>,
    pub list_id: Option<String>,
    pub parent_id: Option<String>,
    pub reply_count: Option<i64>,
}

/// A single liker entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LikedByEntry {
    pub creation_date: Option<String>,
    pub email: Option<String>,
    pub id: Option<i64>,
    pub login_name: Option<String>,
    pub name: Option<String>,
}

/// Who likes the page, plus the current user's status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LikedByInformation {
    pub is_liked_by_current_user: bool,
    pub like_count: i64,
    pub liked_by: Vec<LikedByEntry>,
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
