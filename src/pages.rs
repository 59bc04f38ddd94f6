//! Client side "modern" page: canvas import / export and the page
//! lifecycle against `_api/sitepages/pages(...)`.
//!
//! A [`ClientsidePage`] owns the section tree, the title-region layout
//! part, the page-settings slice, and the raw server document. Network
//! operations take any [`HttpExecutor`]; nothing here retries or
//! recovers — transport errors surface to the caller as-is.

use crate::batch::SPBatch;
use crate::canvas::{
    get_next_order, reindex, CanvasSection, ClientsideText, ClientsideWebpart, ColumnControl,
};
use crate::client::HttpExecutor;
use crate::error::{SharePointError, SharePointResult};
use crate::odata::ODataQuery;
use crate::types::{
    CanvasColumnData, ClientsideTextData, ClientsideWebPartData, ControlEmphasis, CustomMetadata,
    HeaderLayoutType, ImageSourceMetadata, LayoutPartsContent, PageData, PageLayoutType,
    PageSettingsSlice, TextAlignment,
};
use chrono::Datelike;
use log::{debug, info, warn};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::{json, Value};

/// OData type stamp for the page document.
const SITE_PAGE_TYPE: &str = "SP.Publishing.SitePage";

/// Verbose-OData type stamp body: `{"__metadata": {"type": t}}`.
fn metadata(type_name: &str) -> Value {
    json!({ "__metadata": { "type": type_name } })
}

/// Characters that must not appear raw in a URL path embedded into a
/// request line (notably the `$batch` body, which carries URLs
/// literally).
const FILE_PATH_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'{')
    .add(b'}');

/// Encode a file path for a `decodedUrl='...'` segment: single quotes
/// doubled, unsafe characters percent-encoded.
fn encode_file_path(path: &str) -> String {
    utf8_percent_encode(&path.replace('\'', "''"), FILE_PATH_ENCODE).to_string()
}

/// Year of a server timestamp, if it parses.
fn timestamp_year(ts: &str) -> Option<i32> {
    chrono::DateTime::parse_from_rfc3339(ts)
        .map(|d| d.year())
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S")
                .map(|d| d.year())
                .ok()
        })
}

/// Actions like `publish` return a bare boolean or `{"value": bool}`
/// depending on the metadata level.
fn action_result(v: &Value) -> bool {
    v.as_bool().or_else(|| v["value"].as_bool()).unwrap_or(true)
}

/// Display options for the banner image.
#[derive(Debug, Clone, Default)]
pub struct BannerImageProps {
    pub alt_text: Option<String>,
    pub image_source_type: Option<i32>,
    pub translate_x: Option<f64>,
    pub translate_y: Option<f64>,
}

// ═══════════════════════════════════════════════════════════════════════
//  Page repository
// ═══════════════════════════════════════════════════════════════════════

/// Entry points that produce pages: create, load by id, load by file
/// path.
pub struct ClientsidePages<'a, E: HttpExecutor> {
    executor: &'a E,
}

impl<'a, E: HttpExecutor> ClientsidePages<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self { executor }
    }

    /// Create a new page. The server first creates a checked-out page
    /// with a generated filename; we save once with the file name as
    /// the title, then apply the real title in memory (persisted by
    /// the next save).
    pub async fn create(
        &self,
        page_name: &str,
        title: &str,
        layout: PageLayoutType,
    ) -> SharePointResult<ClientsidePage> {
        let page_name = if page_name.to_ascii_lowercase().ends_with(".aspx") {
            &page_name[..page_name.len() - 5]
        } else {
            page_name
        };

        let mut body = metadata(SITE_PAGE_TYPE);
        body.as_object_mut()
            .unwrap()
            .insert("PageLayoutType".into(), serde_json::to_value(layout)?);

        let init = self.executor.post("_api/sitepages/pages", &body).await?;
        let data: PageData = serde_json::from_value(init)?;
        info!("Created page {:?}", data.id);

        let mut page = ClientsidePage::from_json(data)?;
        page.set_title(page_name);
        page.save(self.executor, false).await?;
        page.set_title(title);
        Ok(page)
    }

    /// Load a page by its site-pages item id.
    pub async fn load(&self, id: i64) -> SharePointResult<ClientsidePage> {
        let doc = self
            .executor
            .get(&format!("_api/sitepages/pages({})", id), &[])
            .await?;
        let data: PageData = serde_json::from_value(doc)?;
        let mut page = ClientsidePage::from_json(data)?;

        let item = page
            .get_item(
                self.executor,
                ODataQuery::new().select(["Id", "CommentsDisabled"]),
            )
            .await?;
        page.comments_disabled = item["CommentsDisabled"].as_bool().unwrap_or(false);
        Ok(page)
    }

    /// Load a page from its server-relative file path
    /// (e.g. `/sites/dev/SitePages/welcome.aspx`).
    pub async fn load_by_path(&self, server_relative_path: &str) -> SharePointResult<ClientsidePage> {
        let path = format!(
            "_api/web/getFileByServerRelativePath(decodedUrl='{}')/listItemAllFields",
            encode_file_path(server_relative_path)
        );
        let item = self.executor.get(&path, &[("$select", "Id")]).await?;
        let id = item["Id"]
            .as_i64()
            .ok_or_else(|| SharePointError::not_found(format!(
                "No list item behind file {}",
                server_relative_path
            )))?;
        self.load(id).await
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Page
// ═══════════════════════════════════════════════════════════════════════

/// The data and methods associated with a client side "modern" page.
#[derive(Debug)]
pub struct ClientsidePage {
    data: PageData,
    pub sections: Vec<CanvasSection>,
    layout_part: LayoutPartsContent,
    page_settings: PageSettingsSlice,
    banner_image_dirty: bool,
    pub comments_disabled: bool,
}

impl Default for ClientsidePage {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientsidePage {
    /// An empty, unsaved page with the default layout part and page
    /// settings.
    pub fn new() -> Self {
        Self {
            data: PageData::default(),
            sections: Vec::new(),
            layout_part: LayoutPartsContent::default(),
            page_settings: PageSettingsSlice::default(),
            banner_image_dirty: false,
            comments_disabled: false,
        }
    }

    /// Build a page from a fetched server document, decoding both
    /// string-encoded JSON fields. Malformed JSON in either aborts the
    /// whole load.
    pub fn from_json(data: PageData) -> SharePointResult<Self> {
        let mut page = Self::new();
        page.apply_json(data)?;
        Ok(page)
    }

    fn apply_json(&mut self, data: PageData) -> SharePointResult<()> {
        self.sections.clear();
        self.layout_part = LayoutPartsContent::default();
        self.page_settings = PageSettingsSlice::default();

        if let Some(layout_str) = data.layout_webparts_content.as_deref() {
            let layouts: Value = serde_json::from_str(layout_str)?;
            if let Some(first) = layouts.as_array().and_then(|a| a.first()) {
                // only the first layout entry is active
                self.layout_part = serde_json::from_value(first.clone())?;
            }
        }

        let canvas_entries: Vec<Value> = match data.canvas_content1.as_deref() {
            Some(s) => {
                let v: Value = serde_json::from_str(s)?;
                v.as_array().cloned().unwrap_or_default()
            }
            None => Vec::new(),
        };

        self.data = data;
        self.set_controls(canvas_entries)
    }

    // ─── Canvas import / export ──────────────────────────────────────

    /// Merge raw canvas entries into the tree, classifying by
    /// `controlType`, then reindex the whole tree.
    pub(crate) fn set_controls(&mut self, controls: Vec<Value>) -> SharePointResult<()> {
        let mut seen_settings = false;

        for entry in controls {
            // a missing controlType marks a column / settings entry
            let control_type = entry
                .get("controlType")
                .and_then(Value::as_i64)
                .unwrap_or(0);

            match control_type {
                0 => {
                    if entry.get("pageSettingsSlice").is_some() {
                        if seen_settings {
                            debug!("Multiple pageSettingsSlice entries; last wins");
                        }
                        self.page_settings = serde_json::from_value(entry)?;
                        seen_settings = true;
                    } else {
                        let data: CanvasColumnData = serde_json::from_value(entry)?;
                        self.merge_column_to_tree(data);
                    }
                }
                3 => {
                    let data: ClientsideWebPartData = serde_json::from_value(entry)?;
                    self.merge_part_to_tree(ColumnControl::WebPart(
                        ClientsideWebpart::from_data(data),
                    ));
                }
                4 => {
                    let data: ClientsideTextData = serde_json::from_value(entry)?;
                    self.merge_part_to_tree(ColumnControl::Text(ClientsideText::from_data(data)));
                }
                other => {
                    warn!("Ignoring canvas control with unknown controlType {}", other);
                }
            }
        }

        reindex(&mut self.sections);
        Ok(())
    }

    /// Flatten the tree back to the canvas array: one marker per empty
    /// column, one entry per control stamped with its section's
    /// emphasis, and the page-settings slice last.
    pub fn get_controls(&mut self) -> Vec<Value> {
        reindex(&mut self.sections);

        let mut canvas: Vec<Value> = Vec::new();

        for section in &mut self.sections {
            let emphasis = ControlEmphasis::from_value(section.emphasis);
            for column in &mut section.columns {
                if column.controls.is_empty() {
                    canvas.push(json!({
                        "displayMode": column.data().display_mode,
                        "emphasis": emphasis,
                        "position": column.data().position,
                    }));
                } else {
                    for control in &mut column.controls {
                        control.set_emphasis(emphasis.clone());
                        canvas.push(control.to_value());
                    }
                }
            }
        }

        canvas.push(serde_json::to_value(&self.page_settings).unwrap_or(Value::Null));
        canvas
    }

    /// The string-encoded canvas array for `CanvasContent1`.
    pub fn canvas_content(&mut self) -> String {
        Value::Array(self.get_controls()).to_string()
    }

    /// The string-encoded single-element layout array for
    /// `LayoutWebpartsContent`.
    pub fn layout_webparts_content(&self) -> String {
        match serde_json::to_value(&self.layout_part) {
            Ok(v) => Value::Array(vec![v]).to_string(),
            Err(_) => "null".to_string(),
        }
    }

    fn merge_column_to_tree(&mut self, data: CanvasColumnData) {
        let order = data.position.zone_index;
        let layout_index = data.position.layout_index;
        let emphasis = data.emphasis.zone_emphasis.unwrap_or(0);
        let si = self.get_or_create_section(order, layout_index, emphasis);
        self.sections[si]
            .columns
            .push(crate::canvas::CanvasColumn::new(data));
    }

    fn merge_part_to_tree(&mut self, control: ColumnControl) {
        let pos = control.position().clone();
        let emphasis = control.emphasis_value();
        let si = self.get_or_create_section(pos.zone_index, pos.layout_index, emphasis);
        let section = &mut self.sections[si];

        match section
            .columns
            .iter()
            .position(|c| c.order() == pos.section_index)
        {
            Some(ci) => {
                section.columns[ci].add_control(control);
            }
            None => {
                section
                    .add_column(pos.section_factor.unwrap_or(12))
                    .add_control(control);
            }
        }
    }

    fn get_or_create_section(&mut self, order: i32, layout_index: i32, emphasis: u8) -> usize {
        if let Some(i) = self
            .sections
            .iter()
            .position(|s| s.order == order && s.layout_index == layout_index)
        {
            return i;
        }

        let i = if layout_index == 2 {
            // at most one vertical section per page; merge into it
            match self.sections.iter().position(|s| s.layout_index == 2) {
                Some(existing) => existing,
                None => {
                    let next = get_next_order(self.sections.iter().map(|s| s.order));
                    self.sections.push(CanvasSection::new(next, 2));
                    self.sections.len() - 1
                }
            }
        } else {
            let next = get_next_order(self.sections.iter().map(|s| s.order));
            self.sections.push(CanvasSection::new(next, 1));
            self.sections.len() - 1
        };

        self.sections[i].order = order;
        self.sections[i].emphasis = emphasis;
        i
    }

    // ─── Sections ────────────────────────────────────────────────────

    /// Append a normal section.
    pub fn add_section(&mut self) -> &mut CanvasSection {
        let next = get_next_order(self.sections.iter().map(|s| s.order));
        self.sections.push(CanvasSection::new(next, 1));
        self.sections.last_mut().unwrap()
    }

    /// Get or create the page's single vertical section.
    pub fn add_vertical_section(&mut self) -> &mut CanvasSection {
        if let Some(i) = self.sections.iter().position(|s| s.layout_index == 2) {
            return &mut self.sections[i];
        }
        let next = get_next_order(self.sections.iter().map(|s| s.order));
        self.sections.push(CanvasSection::new(next, 2));
        self.sections.last_mut().unwrap()
    }

    pub fn has_vertical_section(&self) -> bool {
        self.sections.iter().any(|s| s.layout_index == 2)
    }

    pub fn vertical_section(&self) -> Option<&CanvasSection> {
        self.sections.iter().find(|s| s.layout_index == 2)
    }

    pub fn vertical_section_mut(&mut self) -> Option<&mut CanvasSection> {
        self.sections.iter_mut().find(|s| s.layout_index == 2)
    }

    /// Remove a section by 0-based index and reindex the page.
    pub fn remove_section(&mut self, index: usize) -> bool {
        if index >= self.sections.len() {
            return false;
        }
        self.sections.remove(index);
        reindex(&mut self.sections);
        true
    }

    /// Remove a control anywhere in the tree by id and reindex.
    pub fn remove_control(&mut self, id: &str) -> bool {
        for section in &mut self.sections {
            for column in &mut section.columns {
                if column.remove_control(id) {
                    reindex(&mut self.sections);
                    return true;
                }
            }
        }
        false
    }

    // ─── Lookup ──────────────────────────────────────────────────────

    /// First control satisfying the predicate, scanning sections, then
    /// columns, then controls, in order.
    pub fn find_control(&self, predicate: impl Fn(&ColumnControl) -> bool) -> Option<&ColumnControl> {
        self.sections
            .iter()
            .flat_map(|s| s.columns.iter())
            .flat_map(|c| c.controls.iter())
            .find(|c| predicate(c))
    }

    /// Find a control by its instance id.
    pub fn find_control_by_id(&self, id: &str) -> Option<&ColumnControl> {
        self.find_control(|c| c.id() == id)
    }

    // ─── Accessors ───────────────────────────────────────────────────

    pub fn id(&self) -> Option<i64> {
        self.data.id
    }

    pub fn data(&self) -> &PageData {
        &self.data
    }

    pub fn title(&self) -> &str {
        &self.layout_part.properties.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.data.title = Some(title.clone());
        self.layout_part.properties.title = title;
    }

    pub fn topic_header(&self) -> &str {
        self.data.topic_header.as_deref().unwrap_or_default()
    }

    /// Set the topic header; clearing it also hides it.
    pub fn set_topic_header(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.data.topic_header = Some(value.clone());
        self.layout_part.properties.topic_header = value.clone();
        if value.is_empty() {
            self.layout_part.properties.show_topic_header = false;
        }
    }

    pub fn page_layout(&self) -> Option<PageLayoutType> {
        self.data.page_layout_type
    }

    pub fn set_page_layout(&mut self, layout: PageLayoutType) {
        self.data.page_layout_type = Some(layout);
    }

    pub fn layout_type(&self) -> HeaderLayoutType {
        self.layout_part.properties.layout_type
    }

    pub fn set_layout_type(&mut self, layout: HeaderLayoutType) {
        self.layout_part.properties.layout_type = layout;
    }

    pub fn header_text_alignment(&self) -> TextAlignment {
        self.layout_part.properties.text_alignment
    }

    pub fn set_header_text_alignment(&mut self, alignment: TextAlignment) {
        self.layout_part.properties.text_alignment = alignment;
    }

    pub fn show_topic_header(&self) -> bool {
        self.layout_part.properties.show_topic_header
    }

    pub fn set_show_topic_header(&mut self, show: bool) {
        self.layout_part.properties.show_topic_header = show;
    }

    pub fn show_publish_date(&self) -> bool {
        self.layout_part.properties.show_publish_date
    }

    pub fn set_show_publish_date(&mut self, show: bool) {
        self.layout_part.properties.show_publish_date = show;
    }

    pub fn banner_image_url(&self) -> &str {
        self.data.banner_image_url.as_deref().unwrap_or_default()
    }

    /// Set the banner image URL; the actual preview-URL resolution is
    /// deferred to the next save.
    pub fn set_banner_image_url(&mut self, url: impl Into<String>) {
        self.data.banner_image_url = Some(url.into());
        self.banner_image_dirty = true;
    }

    /// Set the banner image with display options.
    pub fn set_banner_image(&mut self, url: impl Into<String>, props: Option<BannerImageProps>) {
        self.set_banner_image_url(url);
        let p = &mut self.layout_part.properties;
        p.image_source_type = Some(2);
        if let Some(props) = props {
            if let Some(x) = props.translate_x {
                p.translate_x = Some(x);
            }
            if let Some(y) = props.translate_y {
                p.translate_y = Some(y);
            }
            if let Some(t) = props.image_source_type {
                p.image_source_type = Some(t);
            }
            if let Some(alt) = props.alt_text {
                p.alt_text = Some(alt);
            }
        }
    }

    // ─── Lifecycle ───────────────────────────────────────────────────

    fn require_id(&self) -> SharePointResult<i64> {
        self.data.id.ok_or_else(SharePointError::page_not_saved)
    }

    /// Persist the content changes. When `publish` is true the page is
    /// also published; otherwise the changes stay in the checked-out
    /// draft.
    pub async fn save<E: HttpExecutor>(
        &mut self,
        executor: &E,
        publish: bool,
    ) -> SharePointResult<bool> {
        let id = self.require_id()?;

        if self.banner_image_dirty {
            self.resolve_banner_image(executor).await?;
        }

        if !self
            .data
            .is_page_checked_out_to_current_user
            .unwrap_or(false)
        {
            executor
                .post_empty(&format!("_api/sitepages/pages({})/checkoutpage", id))
                .await?;
        }

        let canvas = self.canvas_content();
        let layout = self.layout_webparts_content();

        let mut body = metadata(SITE_PAGE_TYPE);
        let obj = body.as_object_mut().unwrap();
        obj.insert(
            "AuthorByline".into(),
            json!(self.data.author_byline.clone().unwrap_or_default()),
        );
        obj.insert("BannerImageUrl".into(), json!(self.banner_image_url()));
        obj.insert("CanvasContent1".into(), json!(canvas));
        obj.insert("LayoutWebpartsContent".into(), json!(layout));
        obj.insert("Title".into(), json!(self.title()));
        obj.insert("TopicHeader".into(), json!(self.topic_header()));

        executor
            .post_with_headers(
                &format!("_api/sitepages/pages({})/savepage", id),
                &body,
                &[("IF-MATCH", "*")],
            )
            .await?;

        let mut result = true;

        if publish {
            let resp = executor
                .post_empty(&format!("_api/sitepages/pages({})/publish", id))
                .await?;
            result = action_result(&resp);
            if result {
                self.data.is_page_checked_out_to_current_user = Some(false);
            }
        }

        self.banner_image_dirty = false;
        Ok(result)
    }

    /// Exchange the raw banner reference for a signed preview URL and
    /// fold the resolved identifiers into the layout part. Must run
    /// before the main save so the stored reference matches the
    /// rendered preview.
    async fn resolve_banner_image<E: HttpExecutor>(&mut self, executor: &E) -> SharePointResult<()> {
        let orig = self.banner_image_url().to_string();

        // best effort: reduce an absolute url to a server-relative one
        let server_relative = if orig.starts_with("http://") || orig.starts_with("https://") {
            let parsed = url::Url::parse(&orig)?;
            match parsed.query() {
                Some(q) => format!("{}?{}", parsed.path(), q),
                None => parsed.path().to_string(),
            }
        } else {
            orig
        };

        let mut batch = SPBatch::new(executor);
        let site_idx = batch.get("_api/site", &ODataQuery::new().select(["Id", "Url"]));
        let web_idx = batch.get("_api/web", &ODataQuery::new().select(["Id", "Url"]));
        let file_idx = batch.get(
            &format!(
                "_api/web/getFileByServerRelativePath(decodedUrl='{}')/listItemAllFields",
                encode_file_path(&server_relative)
            ),
            &ODataQuery::new()
                .select(["UniqueId", "ParentList/Id"])
                .expand(["ParentList"]),
        );

        let results = batch.execute().await?;
        let site = results[site_idx].clone().into_result()?;
        let web = results[web_idx].clone().into_result()?;
        let file = results[file_idx].clone().into_result()?;

        let site_id = site["Id"].as_str().unwrap_or_default().to_string();
        let web_id = web["Id"].as_str().unwrap_or_default().to_string();
        let web_url = web["Url"].as_str().unwrap_or_default().to_string();
        let unique_id = file["UniqueId"].as_str().unwrap_or_default().to_string();
        let list_id = file["ParentList"]["Id"].as_str().unwrap_or_default().to_string();

        debug!(
            "Resolved banner image: site={} web={} file={} list={}",
            site_id, web_id, unique_id, list_id
        );

        // set directly; the resolution itself must not re-mark dirty
        self.data.banner_image_url = Some(format!(
            "{}/_layouts/15/getpreview.ashx?guidSite={}&guidWeb={}&guidFile={}",
            web_url, site_id, web_id, unique_id
        ));

        let spc = &mut self.layout_part.server_processed_content;
        spc.image_sources
            .insert("imageSource".into(), server_relative);
        spc.custom_metadata = Some(CustomMetadata {
            image_source: Some(ImageSourceMetadata {
                site_id: site_id.clone(),
                web_id: web_id.clone(),
                list_id: list_id.clone(),
                unique_id: unique_id.clone(),
            }),
        });

        let props = &mut self.layout_part.properties;
        props.web_id = Some(web_id);
        props.site_id = Some(site_id);
        props.list_id = Some(list_id);
        props.unique_id = Some(unique_id);

        Ok(())
    }

    /// Discard the checkout of this page, reloading local state from
    /// the server's response.
    pub async fn discard_checkout<E: HttpExecutor>(&mut self, executor: &E) -> SharePointResult<()> {
        let id = self.require_id()?;
        let resp = executor
            .post(
                &format!("_api/sitepages/pages({})/discardPage", id),
                &metadata(SITE_PAGE_TYPE),
            )
            .await?;
        let data: PageData = serde_json::from_value(resp)?;
        self.apply_json(data)
    }

    /// Promote this page as a news article.
    ///
    /// When the page has never been meaningfully published
    /// (`LastVersionCreatedBy` empty and `LastVersionCreated` before
    /// the year 2000) the server's news web part would never show a
    /// correct publish date, so one publish is forced first.
    pub async fn promote_to_news<E: HttpExecutor>(
        &mut self,
        executor: &E,
    ) -> SharePointResult<bool> {
        let id = self.require_id()?;

        let never_published = match self.data.version_info.as_ref() {
            Some(vi) => {
                vi.last_version_created_by
                    .as_deref()
                    .unwrap_or_default()
                    .is_empty()
                    && vi
                        .last_version_created
                        .as_deref()
                        .and_then(timestamp_year)
                        .map(|y| y < 2000)
                        .unwrap_or(false)
            }
            None => false,
        };

        if never_published {
            info!("Page {} never published; publishing before promotion", id);
            self.save(executor, true).await?;
        }

        let resp = executor
            .post(
                &format!("_api/sitepages/pages({})/promoteToNews", id),
                &metadata(SITE_PAGE_TYPE),
            )
            .await?;
        Ok(action_result(&resp))
    }

    /// Create a copy of this page with the same canvas content.
    pub async fn copy<E: HttpExecutor>(
        &mut self,
        executor: &E,
        page_name: &str,
        title: &str,
        publish: bool,
    ) -> SharePointResult<ClientsidePage> {
        let layout = self.page_layout().unwrap_or_default();
        let mut page = ClientsidePages::new(executor)
            .create(page_name, title, layout)
            .await?;
        let controls = self.get_controls();
        page.set_controls(controls)?;
        page.save(executor, publish).await?;
        Ok(page)
    }

    // ─── List item plumbing ──────────────────────────────────────────

    /// Absolute URL of the site-pages list, via the ensure endpoint.
    async fn site_pages_list_url<E: HttpExecutor>(&self, executor: &E) -> SharePointResult<String> {
        let resp = executor
            .post_empty(
                "_api/lists/EnsureClientRenderedSitePagesLibrary?$select=EnableModeration,EnableMinorVersions,Id",
            )
            .await?;
        resp["odata.id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| SharePointError::internal("Site pages library has no odata.id"))
    }

    /// Absolute URL of the list item backing this page.
    pub async fn item_url<E: HttpExecutor>(&self, executor: &E) -> SharePointResult<String> {
        let id = self.require_id()?;
        let list = self.site_pages_list_url(executor).await?;
        Ok(format!("{}/items({})", list, id))
    }

    /// The list item associated with this page, with the given query
    /// options applied.
    pub async fn get_item<E: HttpExecutor>(
        &self,
        executor: &E,
        query: ODataQuery,
    ) -> SharePointResult<Value> {
        let url = self.item_url(executor).await?;
        let pairs = query.to_pairs();
        let q: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        executor.get(&url, &q).await
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
