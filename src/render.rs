//! Reference renderer over an in-memory page tree.
//!
//! [`PageTreeRenderer`] interprets a [`MenuConfiguration`] the way a
//! hierarchical menu engine would: it selects the pages of each level,
//! decides each item's [`ItemState`], prints the state's template parts
//! against the page record, and nests sub-levels inside their parent item.
//!
//! ## Item selection
//!
//! | `special` | Level 1 items |
//! |-----------|---------------|
//! | unset | children of the rootline page at `entryLevel` (0 = site root, negative counts back from the current page) |
//! | `list` | the pages listed in `special.value`, in that order |
//! | `directory` | children of the pages in `special.value` (default: current page) |
//! | `language` | the current page once per language in `special.value` |
//!
//! Every level then drops pages listed in `excludeUidList`, pages whose
//! doktype is excluded (folders, recycler, backend sections, plus
//! `excludeDoktypes`), pages hidden from menus (unless `includeNotInMenu`)
//! and spacers (unless the level defines `SPC`). `begin` (1-based) and
//! `maxItems` cut the remaining list.
//!
//! `cache_period`, `minItems` and `protectLvar` are accepted but have no
//! effect on an in-memory tree.

use crate::config::{coerce_int, option_value};
use crate::context::{MENU_ITEM_COUNTER, RecordContext, apply_wrap, value_to_string};
use crate::levels::{ItemState, LANGUAGE_MODE, LevelConfig, MenuConfiguration};
use crate::menu::{MenuRenderer, RenderError};
use crate::placeholder::has_placeholder;
use crate::types::{LinkTarget, PageRecord, find_page, rootline};
use serde_json::{Map, Value};

/// Doktypes that never show up in menus: backend sections, folders, recycler.
pub const DEFAULT_EXCLUDED_DOKTYPES: &[u32] = &[6, 254, 255];

/// Renders menus from a page tree, seen from one current page.
#[derive(Debug, Clone, Default)]
pub struct PageTreeRenderer {
    pages: Vec<PageRecord>,
    rootline: Vec<u64>,
    current: Option<u64>,
    language: u32,
}

impl PageTreeRenderer {
    /// `pages` are the site roots; usually there is exactly one.
    pub fn new(pages: Vec<PageRecord>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    /// Set the current page. Unless a rootline was given explicitly, the
    /// path from the site root to this page becomes the rootline.
    pub fn with_current(mut self, uid: u64) -> Self {
        self.current = Some(uid);
        if self.rootline.is_empty() {
            self.rootline = rootline(&self.pages, uid).unwrap_or_default();
        }
        self
    }

    /// Set the active pages explicitly, site root first.
    pub fn with_rootline(mut self, uids: Vec<u64>) -> Self {
        self.rootline = uids;
        self
    }

    pub fn with_language(mut self, language: u32) -> Self {
        self.language = language;
        self
    }

    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    fn effective_rootline(&self) -> Vec<u64> {
        if self.rootline.is_empty() {
            self.pages.first().map(|root| vec![root.uid]).unwrap_or_default()
        } else {
            self.rootline.clone()
        }
    }

    fn entry_level_pages(&self, entry_level: i64) -> Vec<&PageRecord> {
        let rootline = self.effective_rootline();
        let index = if entry_level < 0 {
            rootline.len() as i64 + entry_level
        } else {
            entry_level
        };
        usize::try_from(index)
            .ok()
            .and_then(|i| rootline.get(i))
            .and_then(|uid| find_page(&self.pages, *uid))
            .map(|page| page.children.iter().collect())
            .unwrap_or_default()
    }

    fn listed_pages(&self, uids: &[u64]) -> Vec<&PageRecord> {
        uids.iter().filter_map(|uid| find_page(&self.pages, *uid)).collect()
    }

    fn directory_pages(&self, uids: &[u64]) -> Vec<&PageRecord> {
        let parents = if uids.is_empty() {
            self.current.into_iter().collect()
        } else {
            uids.to_vec()
        };
        self.listed_pages(&parents)
            .into_iter()
            .flat_map(|page| page.children.iter())
            .collect()
    }

    fn link_for(&self, page: &PageRecord) -> LinkTarget {
        let href = page
            .fields
            .get("slug")
            .and_then(Value::as_str)
            .filter(|slug| !slug.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("/?id={}", page.uid));
        let target = page
            .fields
            .get("target")
            .map(value_to_string)
            .unwrap_or_default();
        LinkTarget::new(href, target)
    }

    fn render_level(
        &self,
        config: &MenuConfiguration,
        depth: u32,
        candidates: Vec<&PageRecord>,
        selection: &Selection,
    ) -> Result<Option<String>, RenderError> {
        let Some(level) = config.level(depth) else {
            return Ok(None);
        };
        let pages = selection.select(candidates, level.state(ItemState::Spacer).is_some());
        if pages.is_empty() {
            return Ok(None);
        }
        let next = config.level(depth + 1);

        let mut out = String::new();
        for (index, page) in pages.iter().enumerate() {
            let active = self.rootline.contains(&page.uid) || selection.always_active.contains(&page.uid);
            let current = self.current == Some(page.uid);
            let has_sub = next.is_some_and(|next_level| {
                !selection
                    .select(
                        page.children.iter().collect(),
                        next_level.state(ItemState::Spacer).is_some(),
                    )
                    .is_empty()
            });

            let state = if page.is_spacer() {
                ItemState::Spacer
            } else {
                match (current, active, has_sub) {
                    (true, _, true) => ItemState::CurrentWithSubmenu,
                    (true, _, false) => ItemState::Current,
                    (false, true, true) => ItemState::ActiveWithSubmenu,
                    (false, true, false) => ItemState::Active,
                    (false, false, true) => ItemState::HasSubmenu,
                    (false, false, false) => ItemState::Normal,
                }
            };

            let mut ctx = RecordContext::page(page.record());
            ctx.set_register(MENU_ITEM_COUNTER, index + 1);
            let link = if page.is_spacer() {
                LinkTarget::default()
            } else {
                self.link_for(page)
            };
            let (mut item, wrap) = print_item(level, state, &ctx, &link, index, pages.len())?;

            if has_sub && (level.expand_all || active) {
                if let (Some(sub), Some(next_level)) = (
                    self.render_level(config, depth + 1, page.children.iter().collect(), selection)?,
                    next,
                ) {
                    match &next_level.wrap {
                        Some(level_wrap) => item.push_str(&apply_wrap(&sub, level_wrap)),
                        None => item.push_str(&sub),
                    }
                }
            }
            out.push_str(&apply_wrap(&item, &wrap));
        }
        Ok(Some(out))
    }

    fn render_language_menu(&self, config: &MenuConfiguration) -> Result<Option<String>, RenderError> {
        let Some(level) = config.level(1) else {
            return Ok(None);
        };
        let Some(page) = self.current.and_then(|uid| find_page(&self.pages, uid)) else {
            return Ok(None);
        };
        // Entries that are not language ids are skipped. The counter keeps the
        // raw list position so the `languageUid` part still picks this entry.
        let languages: Vec<(usize, u32)> = config
            .special_value()
            .split(',')
            .enumerate()
            .filter_map(|(position, entry)| Some((position, entry.trim().parse::<u32>().ok()?)))
            .collect();
        if languages.is_empty() {
            return Ok(None);
        }

        let mut out = String::new();
        for (index, &(position, language)) in languages.iter().enumerate() {
            let state = match (language == self.language, page.is_available_in(language)) {
                (true, true) => ItemState::Active,
                (false, true) => ItemState::Normal,
                (true, false) => ItemState::UnavailableActive,
                (false, false) => ItemState::Unavailable,
            };

            let mut record = page.record();
            record.insert("sys_language_uid".into(), Value::from(language));
            let mut ctx = RecordContext::page(record);
            ctx.set_register(MENU_ITEM_COUNTER, position + 1);

            let link = LinkTarget::new(format!("/?id={}&L={language}", page.uid), "");
            let (item, wrap) = print_item(level, state, &ctx, &link, index, languages.len())?;
            out.push_str(&apply_wrap(&item, &wrap));
        }
        Ok(Some(out))
    }
}

impl MenuRenderer for PageTreeRenderer {
    fn render(&self, config: &MenuConfiguration, ctx: &RecordContext) -> Result<Option<String>, RenderError> {
        if !condition_holds(&config.options, ctx) {
            tracing::debug!("menu condition is false, nothing rendered");
            return Ok(None);
        }
        if config.levels.is_empty() {
            return Err(RenderError::Config("menu has no levels".into()));
        }

        let selection = Selection::from_options(&config.options, ctx);
        let special_uids = uid_list(&config.special_value());
        let body = match config.special().filter(|mode| !mode.is_empty()) {
            None => {
                let entry_level = option_value(&config.options, "entryLevel", ctx)
                    .map(|v| coerce_int(&v))
                    .unwrap_or(0);
                self.render_level(config, 1, self.entry_level_pages(entry_level), &selection)?
            }
            Some("list") => self.render_level(config, 1, self.listed_pages(&special_uids), &selection)?,
            Some("directory") => {
                self.render_level(config, 1, self.directory_pages(&special_uids), &selection)?
            }
            Some(LANGUAGE_MODE) => self.render_language_menu(config)?,
            Some(other) => {
                return Err(RenderError::Config(format!(
                    "unsupported special mode '{other}'"
                )));
            }
        };
        Ok(body.map(|body| apply_wrap(&body, &config.wrap)))
    }
}

/// Print one item in `state` (or `NO` if the level lacks it) and return it
/// with its `wrapItemAndSub` for position `index` of `count`.
fn print_item(
    level: &LevelConfig,
    state: ItemState,
    ctx: &RecordContext,
    link: &LinkTarget,
    index: usize,
    count: usize,
) -> Result<(String, String), RenderError> {
    let (_, template) = level.template_for(state).ok_or_else(|| {
        RenderError::Config(format!("level {} has no NO state", level.depth))
    })?;
    let item = render_parts(template, ctx, |part| level.process_item(part, link))?;
    let wrap = template
        .get("wrapItemAndSub")
        .and_then(Value::as_str)
        .map(|spec| option_split_at(spec, index, count))
        .unwrap_or_else(|| "|".to_string());
    Ok((item, wrap))
}

/// Concatenate a template's parts in numeric key order.
///
/// Only parts whose configured `value` carries a sentinel go through
/// `substitute`; parts rendered from record data never do, so a title or
/// field that happens to contain a sentinel token is kept verbatim.
fn render_parts(
    template: &Value,
    ctx: &RecordContext,
    substitute: impl Fn(&str) -> String,
) -> Result<String, RenderError> {
    let parts = template
        .get("parts")
        .and_then(Value::as_object)
        .ok_or_else(|| RenderError::Config("item template has no parts".into()))?;

    let mut ordered = Vec::with_capacity(parts.len());
    for (key, part) in parts {
        let order: i64 = key
            .trim()
            .parse()
            .map_err(|_| RenderError::Config(format!("part key '{key}' is not a number")))?;
        let conf = part
            .as_object()
            .ok_or_else(|| RenderError::Config(format!("part '{key}' is not a mapping")))?;
        ordered.push((order, conf));
    }
    ordered.sort_by_key(|(order, _)| *order);

    Ok(ordered
        .into_iter()
        .map(|(_, conf)| {
            let text = ctx.std_wrap("", conf);
            let templated = conf
                .get("value")
                .and_then(Value::as_str)
                .is_some_and(has_placeholder);
            if templated { substitute(&text) } else { text }
        })
        .collect())
}

/// Level-independent filters read from the menu options.
#[derive(Debug, Clone, Default, PartialEq)]
struct Selection {
    exclude_uids: Vec<u64>,
    exclude_doktypes: Vec<u32>,
    include_not_in_menu: bool,
    begin: usize,
    max_items: Option<usize>,
    always_active: Vec<u64>,
}

impl Selection {
    fn from_options(options: &Map<String, Value>, ctx: &RecordContext) -> Self {
        let text = |key: &str| {
            option_value(options, key, ctx)
                .map(|v| value_to_string(&v))
                .unwrap_or_default()
        };
        let int = |key: &str| option_value(options, key, ctx).map(|v| coerce_int(&v)).unwrap_or(0);

        let mut exclude_doktypes = DEFAULT_EXCLUDED_DOKTYPES.to_vec();
        exclude_doktypes.extend(
            uid_list(&text("excludeDoktypes"))
                .into_iter()
                .filter_map(|d| u32::try_from(d).ok()),
        );

        Self {
            exclude_uids: uid_list(&text("excludeUidList")),
            exclude_doktypes,
            include_not_in_menu: int("includeNotInMenu") != 0,
            begin: usize::try_from(int("begin")).unwrap_or(0),
            max_items: usize::try_from(int("maxItems")).ok().filter(|&n| n > 0),
            always_active: uid_list(&text("alwaysActivePIDlist")),
        }
    }

    fn select<'p>(&self, candidates: Vec<&'p PageRecord>, keep_spacers: bool) -> Vec<&'p PageRecord> {
        let mut pages: Vec<&PageRecord> = candidates
            .into_iter()
            .filter(|page| !self.exclude_uids.contains(&page.uid))
            .filter(|page| !self.exclude_doktypes.contains(&page.doktype))
            .filter(|page| self.include_not_in_menu || !page.nav_hide)
            .filter(|page| keep_spacers || !page.is_spacer())
            .collect();
        if self.begin > 1 {
            pages.drain(..(self.begin - 1).min(pages.len()));
        }
        if let Some(max) = self.max_items {
            pages.truncate(max);
        }
        pages
    }
}

/// Evaluate the `if.` guard: `isTrue` must be truthy, `isFalse` falsy,
/// `negate` flips the outcome. No guard means the menu renders.
fn condition_holds(options: &Map<String, Value>, ctx: &RecordContext) -> bool {
    let Some(conf) = options.get("if.").and_then(Value::as_object) else {
        return true;
    };
    let truthy = |key: &str| {
        option_value(conf, key, ctx).map(|v| {
            let text = value_to_string(&v);
            let text = text.trim();
            !text.is_empty() && text != "0"
        })
    };

    let mut holds = true;
    if let Some(is_true) = truthy("isTrue") {
        holds &= is_true;
    }
    if let Some(is_false) = truthy("isFalse") {
        holds &= !is_false;
    }
    if truthy("negate") == Some(true) {
        holds = !holds;
    }
    holds
}

/// Parse a comma-separated uid list, skipping anything that is not a number.
pub fn uid_list(text: &str) -> Vec<u64> {
    text.split(',')
        .filter_map(|entry| entry.trim().parse().ok())
        .collect()
}

/// Distribute an option-split value over `count` items.
///
/// `first |*| middle |*| last`: each section may hold several `||`
/// separated values. The last section claims the final items, the first
/// section the leading ones, and the middle section repeats over whatever
/// is left (the last value of the first section repeats when there is no
/// middle). All values are trimmed.
pub fn option_split(spec: &str, count: usize) -> Vec<String> {
    (0..count).map(|index| option_split_at(spec, index, count)).collect()
}

fn option_split_at(spec: &str, index: usize, count: usize) -> String {
    let sections: Vec<Vec<&str>> = spec
        .split("|*|")
        .map(|section| section.split("||").map(str::trim).collect())
        .collect();
    let first = sections.first().cloned().unwrap_or_default();
    let middle: Vec<&str> = sections
        .get(1)
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter(|value| !value.is_empty())
        .collect();
    let last: Vec<&str> = sections
        .get(2)
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter(|value| !value.is_empty())
        .collect();

    let last_start = count.saturating_sub(last.len());
    if index >= last_start && !last.is_empty() {
        return last[index - last_start].to_string();
    }
    if index < first.len() {
        return first[index].to_string();
    }
    if !middle.is_empty() {
        return middle[(index - first.len()) % middle.len()].to_string();
    }
    first.last().map(|value| value.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MenuOptions, filter_renderer_options};
    use crate::levels::build_configuration;
    use crate::placeholder::{LINK_PLACEHOLDER, TARGET_PLACEHOLDER};
    use crate::test_helpers::*;
    use serde_json::json;

    fn configuration(options: Value) -> MenuConfiguration {
        let options = options.as_object().cloned().unwrap_or_default();
        let ctx = RecordContext::default();
        let menu_options = MenuOptions::from_options(&options, &ctx).unwrap();
        build_configuration(&menu_options, filter_renderer_options(&options, &ctx))
    }

    fn render(renderer: &PageTreeRenderer, options: Value) -> Option<Vec<Value>> {
        renderer
            .render(&configuration(options), &RecordContext::default())
            .unwrap()
            .map(|text| serde_json::from_str(&text).unwrap_or_else(|e| panic!("{e}: {text}")))
    }

    fn titles(items: &[Value]) -> Vec<&str> {
        items.iter().map(|item| item["title"].as_str().unwrap()).collect()
    }

    // =========================================================================
    // Level 1 selection
    // =========================================================================

    #[test]
    fn default_menu_lists_root_children() {
        let items = render(&PageTreeRenderer::new(sample_pages()), json!({})).unwrap();
        assert_eq!(titles(&items), vec!["Products", "About us"]);
        assert_eq!(items[0]["link"], json!("/products"));
        assert_eq!(items[0]["target"], json!(""));
        assert_eq!(items[1]["data"]["uid"], json!(6));
        assert!(items[0].get("children").is_none());
    }

    #[test]
    fn states_follow_the_rootline() {
        let renderer = PageTreeRenderer::new(sample_pages()).with_current(2);
        let items = render(&renderer, json!({})).unwrap();
        assert_eq!(items[0]["active"], json!(1));
        assert_eq!(items[0]["current"], json!(1));
        assert_eq!(items[1]["active"], json!(0));
        assert_eq!(items[1]["current"], json!(0));
        assert_eq!(items[1]["spacer"], json!(0));
    }

    #[test]
    fn special_list_keeps_given_order() {
        let items = render(
            &PageTreeRenderer::new(sample_pages()),
            json!({"special": "list", "special.": {"value": "6, 2, 99"}}),
        )
        .unwrap();
        assert_eq!(titles(&items), vec!["About us", "Products"]);
    }

    #[test]
    fn special_directory_lists_children() {
        let items = render(
            &PageTreeRenderer::new(sample_pages()),
            json!({"special": "directory", "special.": {"value": "2"}}),
        )
        .unwrap();
        assert_eq!(titles(&items), vec!["Widgets"]);

        let renderer = PageTreeRenderer::new(sample_pages()).with_current(6);
        let items = render(&renderer, json!({"special": "directory"})).unwrap();
        assert_eq!(titles(&items), vec!["Team"]);
    }

    #[test]
    fn entry_level_walks_the_rootline() {
        let renderer = PageTreeRenderer::new(sample_pages()).with_current(4);
        let items = render(&renderer, json!({"entryLevel": 1})).unwrap();
        assert_eq!(titles(&items), vec!["Widgets"]);

        let renderer = PageTreeRenderer::new(sample_pages()).with_current(6);
        let items = render(&renderer, json!({"entryLevel": -1})).unwrap();
        assert_eq!(titles(&items), vec!["Team"]);

        assert!(render(&renderer, json!({"entryLevel": 5})).is_none());
    }

    #[test]
    fn unsupported_special_mode_is_an_error() {
        let result = PageTreeRenderer::new(sample_pages())
            .render(&configuration(json!({"special": "rootline"})), &RecordContext::default());
        assert!(matches!(result, Err(RenderError::Config(_))));
    }

    // =========================================================================
    // Filters
    // =========================================================================

    #[test]
    fn exclude_uid_list_and_doktypes() {
        let renderer = PageTreeRenderer::new(sample_pages());
        let items = render(&renderer, json!({"excludeUidList": "6"})).unwrap();
        assert_eq!(titles(&items), vec!["Products"]);

        let items = render(&renderer, json!({"excludeDoktypes": "1"})).unwrap_or_default();
        assert!(items.is_empty());
    }

    #[test]
    fn hidden_pages_need_include_not_in_menu() {
        let renderer = PageTreeRenderer::new(sample_pages());
        let items = render(&renderer, json!({"special": "directory", "special.": {"value": "2"}, "includeNotInMenu": 1}))
            .unwrap();
        assert_eq!(titles(&items), vec!["Widgets", "Internal"]);
    }

    #[test]
    fn begin_and_max_items() {
        let renderer = PageTreeRenderer::new(sample_pages());
        assert_eq!(titles(&render(&renderer, json!({"begin": 2})).unwrap()), vec!["About us"]);
        assert_eq!(titles(&render(&renderer, json!({"maxItems": 1})).unwrap()), vec!["Products"]);
        assert!(render(&renderer, json!({"begin": 3})).is_none());
    }

    #[test]
    fn spacers_only_with_include_spacer() {
        let renderer = PageTreeRenderer::new(sample_pages());
        let items = render(&renderer, json!({"includeSpacer": 1})).unwrap();
        assert_eq!(titles(&items), vec!["Products", "----", "About us"]);
        assert_eq!(items[1]["spacer"], json!(1));
        assert_eq!(items[1]["link"], json!(""));
        assert_eq!(items[0]["spacer"], json!(0));
    }

    #[test]
    fn false_condition_renders_nothing() {
        let renderer = PageTreeRenderer::new(sample_pages());
        assert!(render(&renderer, json!({"if.": {"isTrue": "0"}})).is_none());
        assert!(render(&renderer, json!({"if.": {"isTrue": "1"}})).is_some());
        assert!(render(&renderer, json!({"if.": {"isTrue": "1", "negate": 1}})).is_none());
    }

    #[test]
    fn always_active_pages_are_marked_active() {
        let renderer = PageTreeRenderer::new(sample_pages());
        let items = render(&renderer, json!({"alwaysActivePIDlist": "6"})).unwrap();
        assert_eq!(items[1]["active"], json!(1));
        assert_eq!(items[1]["current"], json!(0));
    }

    // =========================================================================
    // Sub-menus
    // =========================================================================

    #[test]
    fn expand_all_renders_every_submenu() {
        let items = render(&PageTreeRenderer::new(sample_pages()), json!({"levels": 2})).unwrap();
        assert_eq!(titles(items[0]["children"].as_array().unwrap()), vec!["Widgets"]);
        assert_eq!(titles(items[1]["children"].as_array().unwrap()), vec!["Team"]);
    }

    #[test]
    fn collapsed_menu_expands_only_the_active_branch() {
        let renderer = PageTreeRenderer::new(sample_pages()).with_current(4);
        let items = render(&renderer, json!({"levels": 2, "expandAll": 0})).unwrap();
        let products = items[0]["children"].as_array().unwrap();
        assert_eq!(titles(products), vec!["Widgets"]);
        assert_eq!(products[0]["current"], json!(1));
        assert!(items[1].get("children").is_none());
    }

    #[test]
    fn single_level_never_nests() {
        let items = render(&PageTreeRenderer::new(sample_pages()), json!({"levels": 1})).unwrap();
        assert!(items.iter().all(|item| item.get("children").is_none()));
    }

    #[test]
    fn unsafe_titles_stay_valid_json() {
        let mut pages = sample_pages();
        pages[0].children[0]
            .fields
            .insert("title".into(), json!(r#"  Fish & "Chips" <b>'s  "#));
        pages[0].children[0]
            .fields
            .insert("slug".into(), json!(r#"/fish?x="1"&y=<2>"#));
        let items = render(&PageTreeRenderer::new(pages), json!({})).unwrap();
        assert_eq!(items[0]["title"], json!(r#"Fish & "Chips" <b>'s"#));
        assert_eq!(items[0]["link"], json!(r#"/fish?x="1"&y=<2>"#));
    }

    #[test]
    fn sentinel_tokens_in_record_data_are_kept_verbatim() {
        let mut pages = sample_pages();
        let products = &mut pages[0].children[0].fields;
        products.insert("title".into(), json!(format!("Docs on {LINK_PLACEHOLDER} tokens")));
        products.insert("subtitle".into(), json!(TARGET_PLACEHOLDER));
        let renderer = PageTreeRenderer::new(pages).with_current(2);

        let items = render(&renderer, json!({})).unwrap();
        assert_eq!(items[0]["title"], json!(format!("Docs on {LINK_PLACEHOLDER} tokens")));
        assert_eq!(items[0]["link"], json!("/products"));
        assert_eq!(items[0]["target"], json!(""));
        assert_eq!(items[0]["data"]["subtitle"], json!(TARGET_PLACEHOLDER));
    }

    // =========================================================================
    // Language menus
    // =========================================================================

    #[test]
    fn language_menu_marks_availability() {
        let renderer = PageTreeRenderer::new(sample_pages())
            .with_current(6)
            .with_language(1);
        let items = render(
            &renderer,
            json!({"special": "language", "special.": {"value": "0,1,2"}}),
        )
        .unwrap();

        assert_eq!(items.len(), 3);
        let uids: Vec<&str> = items.iter().map(|i| i["languageUid"].as_str().unwrap()).collect();
        assert_eq!(uids, vec!["0", "1", "2"]);
        let available: Vec<i64> = items.iter().map(|i| i["available"].as_i64().unwrap()).collect();
        assert_eq!(available, vec![1, 1, 0]);
        assert_eq!(items[1]["active"], json!(1));
        assert_eq!(items[0]["link"], json!("/?id=6&L=0"));
    }

    #[test]
    fn language_menu_skips_entries_that_are_not_ids() {
        let renderer = PageTreeRenderer::new(sample_pages()).with_current(6);
        let items = render(
            &renderer,
            json!({"special": "language", "special.": {"value": "0, x,1,"}}),
        )
        .unwrap();

        let uids: Vec<&str> = items.iter().map(|i| i["languageUid"].as_str().unwrap()).collect();
        assert_eq!(uids, vec!["0", "1"]);
        assert_eq!(items[1]["link"], json!("/?id=6&L=1"));
        assert_eq!(items[1]["available"], json!(1));
    }

    #[test]
    fn language_menu_without_current_page_is_empty() {
        let renderer = PageTreeRenderer::new(sample_pages());
        assert!(render(&renderer, json!({"special": "language", "special.": {"value": "0,1"}})).is_none());
    }

    // =========================================================================
    // Option split
    // =========================================================================

    #[test]
    fn option_split_first_middle_last() {
        let spec = "{|}, |*| {|}, |*| {|}";
        assert_eq!(option_split(spec, 1), vec!["{|}"]);
        assert_eq!(option_split(spec, 2), vec!["{|},", "{|}"]);
        assert_eq!(option_split(spec, 4), vec!["{|},", "{|},", "{|},", "{|}"]);
    }

    #[test]
    fn option_split_rotates_middle_values() {
        let spec = "F |*| a || b |*| L";
        assert_eq!(option_split(spec, 5), vec!["F", "a", "b", "a", "L"]);
    }

    #[test]
    fn option_split_without_sections_repeats() {
        assert_eq!(option_split("x || y", 4), vec!["x", "y", "y", "y"]);
        assert_eq!(option_split("<li>|</li>", 2), vec!["<li>|</li>", "<li>|</li>"]);
    }

    #[test]
    fn uid_list_skips_garbage() {
        assert_eq!(uid_list("1, 2,x,,3"), vec![1, 2, 3]);
        assert!(uid_list("").is_empty());
    }
}
