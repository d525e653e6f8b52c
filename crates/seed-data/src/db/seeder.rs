//! Idempotent seeding of the navigation tables.

use std::collections::BTreeMap;

use futures::{StreamExt, TryStreamExt, stream};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SeedConfig;
use crate::models::{
    Dataset, Feature, HomeLink, MainPage, MenuItem, NavItem, OtherMenuItem, PageGroup, Section,
    SocialIcon, SubItem, non_empty,
};
use crate::schema::Table;
use crate::store::{InsertRow, SeedBackend, SeedStore, Value};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid dataset: {0}")]
    Dataset(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Insert counts for one record kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindSummary {
    /// Inserts issued, including skipped ones.
    pub attempted: usize,
    /// Rows actually written.
    pub inserted: usize,
}

impl KindSummary {
    fn record(&mut self, id: Option<Uuid>) {
        self.attempted += 1;
        if id.is_some() {
            self.inserted += 1;
        }
    }

    pub fn skipped(&self) -> usize {
        self.attempted - self.inserted
    }
}

/// Outcome of a committed seeding run, keyed by table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SeedSummary {
    kinds: BTreeMap<Table, KindSummary>,
}

impl SeedSummary {
    pub fn get(&self, table: Table) -> KindSummary {
        self.kinds.get(&table).copied().unwrap_or_default()
    }

    pub fn total_inserted(&self) -> usize {
        self.kinds.values().map(|k| k.inserted).sum()
    }

    pub fn total_attempted(&self) -> usize {
        self.kinds.values().map(|k| k.attempted).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Table, KindSummary)> + '_ {
        self.kinds.iter().map(|(table, kind)| (*table, *kind))
    }
}

/// Seeds the navigation dataset through a storage backend.
///
/// Each [`Seeder::run`] opens one transaction, creates any missing tables,
/// seeds all nine record kinds in a fixed order and commits. Any failure
/// rolls the whole run back.
#[derive(Clone)]
pub struct Seeder<B> {
    backend: B,
    config: SeedConfig,
}

impl<B: SeedBackend> Seeder<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            config: SeedConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SeedConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets how many flat inserts may be in flight at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Runs a full seeding pass in a single transaction.
    pub async fn run(&self, dataset: &Dataset) -> Result<SeedSummary, SeedError> {
        info!("Seeding navigation data...");

        let store = self.backend.begin().await?;

        match self.seed_all(&store, dataset).await {
            Ok(summary) => {
                store.commit().await?;
                info!(
                    "Seeded navigation data: {} of {} rows inserted",
                    summary.total_inserted(),
                    summary.total_attempted()
                );
                Ok(summary)
            }
            Err(e) => {
                warn!("Seeding failed, rolling back: {e}");
                if let Err(rollback_err) = store.rollback().await {
                    warn!("Rollback failed: {rollback_err}");
                }
                Err(e)
            }
        }
    }

    async fn seed_all(&self, store: &B::Store, dataset: &Dataset) -> Result<SeedSummary, SeedError> {
        ensure_schema(store).await?;

        let mut kinds = BTreeMap::new();
        kinds.insert(
            Table::MenuItems,
            seed_menu_items(store, &dataset.menu_items).await?,
        );
        kinds.insert(Table::Pages, seed_pages(store, &dataset.pages).await?);
        kinds.insert(
            Table::NavItems,
            self.seed_flat(store, Table::NavItems, dataset.nav_items.iter().map(nav_item_row))
                .await?,
        );
        kinds.insert(
            Table::MainPages,
            self.seed_flat(store, Table::MainPages, dataset.main_pages.iter().map(main_page_row))
                .await?,
        );
        kinds.insert(
            Table::Features,
            self.seed_flat(store, Table::Features, dataset.features.iter().map(feature_row))
                .await?,
        );
        kinds.insert(
            Table::HomeLinks,
            self.seed_flat(store, Table::HomeLinks, dataset.home_links.iter().map(home_link_row))
                .await?,
        );
        kinds.insert(
            Table::OtherMenuItems,
            self.seed_flat(
                store,
                Table::OtherMenuItems,
                dataset.other_menu_items.iter().map(other_menu_item_row),
            )
            .await?,
        );
        kinds.insert(
            Table::SocialIcons,
            self.seed_flat(
                store,
                Table::SocialIcons,
                dataset.social_icons.iter().map(social_icon_row),
            )
            .await?,
        );
        kinds.insert(Table::Sections, seed_sections(store, &dataset.sections).await?);

        Ok(SeedSummary { kinds })
    }

    /// Scatters independent inserts and gathers them before returning.
    async fn seed_flat(
        &self,
        store: &B::Store,
        table: Table,
        rows: impl Iterator<Item = InsertRow> + Send,
    ) -> Result<KindSummary, SeedError> {
        let rows: Vec<InsertRow> = rows.collect();
        info!("Seeding {} {}...", rows.len(), table);

        let ids: Vec<Option<Uuid>> = stream::iter(rows)
            .map(|row| store.insert(row))
            .buffer_unordered(self.config.concurrency.max(1))
            .try_collect()
            .await?;

        let mut summary = KindSummary::default();
        for id in ids {
            summary.record(id);
        }

        info!(
            "Seeded {} {} ({} skipped)",
            summary.inserted,
            table,
            summary.skipped()
        );
        Ok(summary)
    }
}

/// Creates every table and unique index that does not exist yet.
pub async fn ensure_schema<S: SeedStore>(store: &S) -> Result<(), SeedError> {
    for table in Table::ALL {
        store.ensure_table(table).await?;
    }
    Ok(())
}

/// Inserts one menu row, optionally linked to a parent.
async fn insert_menu_row<S: SeedStore>(
    store: &S,
    summary: &mut KindSummary,
    menu_id: i32,
    label: &str,
    href: Option<&str>,
    parent_id: Option<Uuid>,
) -> Result<Option<Uuid>, SeedError> {
    let row = InsertRow::new(Table::MenuItems)
        .value("menu_id", Value::Int(menu_id))
        .value("label", Value::text(label))
        .value("href", Value::Text(href.map(str::to_string)))
        .value("parent_id", Value::Uuid(parent_id));

    let id = store.insert(row).await?;
    summary.record(id);
    Ok(id)
}

/// Seeds menu trees parent-first.
///
/// A child is only written once its parent's id is known. When a parent
/// insert is skipped its children get a NULL `parent_id`; the existing
/// parent is not looked up. Label-only sub-items are not stored.
pub async fn seed_menu_items<S: SeedStore>(
    store: &S,
    items: &[MenuItem],
) -> Result<KindSummary, SeedError> {
    info!("Seeding {} menu items...", items.len());
    let mut summary = KindSummary::default();

    for item in items {
        let parent_id = insert_menu_row(
            store,
            &mut summary,
            item.id,
            &item.label,
            non_empty(item.href.clone()).as_deref(),
            None,
        )
        .await?;

        for sub_item in &item.sub_items {
            match sub_item {
                SubItem::Link(link) => {
                    insert_menu_row(
                        store,
                        &mut summary,
                        item.id,
                        &link.label,
                        link.href.as_deref(),
                        parent_id,
                    )
                    .await?;
                }
                SubItem::Group(group) => {
                    let group_id = insert_menu_row(
                        store,
                        &mut summary,
                        item.id,
                        &group.label,
                        None,
                        parent_id,
                    )
                    .await?;

                    for nested in &group.sub_items {
                        insert_menu_row(
                            store,
                            &mut summary,
                            item.id,
                            &nested.label,
                            nested.href.as_deref(),
                            group_id,
                        )
                        .await?;
                    }
                }
                SubItem::Label(label) => {
                    debug!("Skipping menu entry {} without link or children", label.label);
                }
            }
        }
    }

    info!(
        "Seeded {} menu items ({} skipped)",
        summary.inserted,
        summary.skipped()
    );
    Ok(summary)
}

/// Seeds page entries, repeating the group header on every row.
pub async fn seed_pages<S: SeedStore>(
    store: &S,
    groups: &[PageGroup],
) -> Result<KindSummary, SeedError> {
    info!("Seeding {} page groups...", groups.len());
    let mut summary = KindSummary::default();

    for group in groups {
        for item in &group.items {
            let badge = item.badge.as_ref();
            let row = InsertRow::new(Table::Pages)
                .value("page_id", Value::Int(group.id))
                .value("header", Value::text(&group.header))
                .value("href", Value::text(&item.href))
                .value("label", Value::text(&item.label))
                .value(
                    "badge_text",
                    Value::Text(non_empty(badge.and_then(|b| b.text.clone()))),
                )
                .value(
                    "badge_class",
                    Value::Text(non_empty(badge.and_then(|b| b.class_name.clone()))),
                );

            summary.record(store.insert(row).await?);
        }
    }

    info!("Seeded {} pages ({} skipped)", summary.inserted, summary.skipped());
    Ok(summary)
}

/// Seeds footer sections as one row per link.
pub async fn seed_sections<S: SeedStore>(
    store: &S,
    sections: &[Section],
) -> Result<KindSummary, SeedError> {
    info!("Seeding {} sections...", sections.len());
    let mut summary = KindSummary::default();

    for section in sections {
        for link in &section.links {
            let row = InsertRow::new(Table::Sections)
                .value("title", Value::text(&section.title))
                .value("link_text", Value::text(&link.text))
                .value("link_href", Value::text(&link.href));

            summary.record(store.insert(row).await?);
        }
    }

    info!(
        "Seeded {} section links ({} skipped)",
        summary.inserted,
        summary.skipped()
    );
    Ok(summary)
}

fn nav_item_row(item: &NavItem) -> InsertRow {
    InsertRow::new(Table::NavItems)
        .value("href", Value::text(&item.href))
        .value("label", Value::text(&item.label))
        .value("active", Value::Bool(item.active))
}

fn main_page_row(page: &MainPage) -> InsertRow {
    InsertRow::new(Table::MainPages)
        .value("href", Value::text(&page.href))
        .value("alt", Value::text(&page.alt))
        .value("src", Value::text(&page.src))
        .value("title", Value::text(&page.title))
}

fn feature_row(feature: &Feature) -> InsertRow {
    InsertRow::new(Table::Features)
        .value("feature_id", Value::Int(feature.id))
        .value("icon_class", Value::text(&feature.icon_class))
        .value("title", Value::text(&feature.title))
        .value("description", Value::text(&feature.description))
}

fn home_link_row(link: &HomeLink) -> InsertRow {
    InsertRow::new(Table::HomeLinks)
        .value("link_id", Value::Int(link.id))
        .value("href", Value::text(&link.href))
        .value("img_alt", Value::text(&link.img_alt))
        .value("img_src", Value::text(&link.img_src))
        .value("label", Value::text(&link.label))
}

fn other_menu_item_row(item: &OtherMenuItem) -> InsertRow {
    InsertRow::new(Table::OtherMenuItems)
        .value("href", Value::text(&item.href))
        .value("icon", Value::text(&item.icon))
        .value("title", Value::text(&item.title))
}

fn social_icon_row(icon: &SocialIcon) -> InsertRow {
    InsertRow::new(Table::SocialIcons)
        .value("href", Value::text(&icon.href))
        .value("icon_class", Value::text(&icon.icon_class))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Badge, MenuGroup, MenuLabel, MenuLink, PageItem, SectionLink};
    use crate::store::MemoryBackend;

    fn link(label: &str, href: &str) -> MenuLink {
        MenuLink {
            label: label.to_string(),
            href: Some(href.to_string()),
        }
    }

    fn nav_item(href: &str) -> NavItem {
        NavItem {
            href: href.to_string(),
            label: format!("Label {href}"),
            active: false,
        }
    }

    fn menu_dataset() -> Dataset {
        Dataset {
            menu_items: vec![
                MenuItem {
                    id: 1,
                    label: "Home".to_string(),
                    href: Some("/".to_string()),
                    sub_items: vec![],
                },
                MenuItem {
                    id: 2,
                    label: "Pages".to_string(),
                    href: None,
                    sub_items: vec![
                        SubItem::Link(link("About", "/about")),
                        SubItem::Group(MenuGroup {
                            label: "Account".to_string(),
                            sub_items: vec![
                                link("Sign In", "/sign-in"),
                                link("Sign Up", "/sign-up"),
                            ],
                        }),
                    ],
                },
            ],
            ..Dataset::default()
        }
    }

    fn row_by_label(backend: &MemoryBackend, label: &str) -> crate::store::MemoryRow {
        backend
            .rows(Table::MenuItems)
            .into_iter()
            .find(|r| r.text("label") == Some(label))
            .unwrap_or_else(|| panic!("no menu row labelled {label}"))
    }

    #[tokio::test]
    async fn test_run_creates_all_tables() {
        let backend = MemoryBackend::new();
        let seeder = Seeder::new(backend.clone());

        seeder.run(&Dataset::default()).await.unwrap();

        for table in Table::ALL {
            assert!(backend.has_table(table), "{table} was not created");
        }
    }

    #[tokio::test]
    async fn test_builtin_dataset_is_idempotent() {
        let backend = MemoryBackend::new();
        let seeder = Seeder::new(backend.clone());
        let dataset = Dataset::builtin().unwrap();

        let first = seeder.run(&dataset).await.unwrap();
        let counts: Vec<usize> = Table::ALL.iter().map(|t| backend.row_count(*t)).collect();

        let second = seeder.run(&dataset).await.unwrap();
        let rerun_counts: Vec<usize> = Table::ALL.iter().map(|t| backend.row_count(*t)).collect();

        assert_eq!(counts, rerun_counts);
        assert_eq!(first.total_inserted(), first.total_attempted());
        assert_eq!(second.total_inserted(), 0);
        assert_eq!(second.total_attempted(), first.total_attempted());
    }

    #[tokio::test]
    async fn test_menu_hierarchy_links_parents() {
        let backend = MemoryBackend::new();
        let seeder = Seeder::new(backend.clone());

        seeder.run(&menu_dataset()).await.unwrap();

        let pages = row_by_label(&backend, "Pages");
        let about = row_by_label(&backend, "About");
        let account = row_by_label(&backend, "Account");
        let sign_in = row_by_label(&backend, "Sign In");
        let sign_up = row_by_label(&backend, "Sign Up");

        assert_eq!(pages.uuid("parent_id"), None);
        assert_eq!(about.uuid("parent_id"), Some(pages.id));
        assert_eq!(account.uuid("parent_id"), Some(pages.id));
        assert_eq!(account.text("href"), None);
        assert_eq!(sign_in.uuid("parent_id"), Some(account.id));
        assert_eq!(sign_up.uuid("parent_id"), Some(account.id));
        for row in [&about, &account, &sign_in, &sign_up] {
            assert_eq!(row.int("menu_id"), Some(2));
        }
    }

    #[tokio::test]
    async fn test_menu_item_without_children_is_single_row() {
        let backend = MemoryBackend::new();
        let seeder = Seeder::new(backend.clone());
        let dataset = Dataset {
            menu_items: vec![MenuItem {
                id: 7,
                label: "Contact".to_string(),
                href: Some("/contact".to_string()),
                sub_items: vec![],
            }],
            ..Dataset::default()
        };

        let summary = seeder.run(&dataset).await.unwrap();

        assert_eq!(backend.row_count(Table::MenuItems), 1);
        assert_eq!(summary.get(Table::MenuItems).inserted, 1);
        assert!(
            backend
                .rows(Table::MenuItems)
                .iter()
                .all(|r| r.uuid("parent_id").is_none())
        );
    }

    #[tokio::test]
    async fn test_skipped_parent_leaves_new_children_orphaned() {
        let backend = MemoryBackend::new();
        let seeder = Seeder::new(backend.clone());
        let mut dataset = menu_dataset();
        seeder.run(&dataset).await.unwrap();

        if let Some(MenuItem { sub_items, .. }) = dataset.menu_items.get_mut(1) {
            sub_items.push(SubItem::Link(link("Careers", "/careers")));
        }
        let summary = seeder.run(&dataset).await.unwrap();

        let careers = row_by_label(&backend, "Careers");
        assert_eq!(careers.uuid("parent_id"), None);
        assert_eq!(summary.get(Table::MenuItems).inserted, 1);
    }

    #[tokio::test]
    async fn test_page_group_repeats_header() {
        let backend = MemoryBackend::new();
        let seeder = Seeder::new(backend.clone());
        let item = |href: &str, label: &str| PageItem {
            href: href.to_string(),
            label: label.to_string(),
            badge: None,
        };
        let dataset = Dataset {
            pages: vec![PageGroup {
                id: 2,
                header: "Account".to_string(),
                items: vec![
                    item("/profile", "Profile"),
                    item("/settings", "Settings"),
                    PageItem {
                        badge: Some(Badge {
                            text: Some("New".to_string()),
                            class_name: None,
                        }),
                        ..item("/billing", "Billing")
                    },
                ],
            }],
            ..Dataset::default()
        };

        seeder.run(&dataset).await.unwrap();

        let rows = backend.rows(Table::Pages);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.text("header") == Some("Account")));

        let billing = rows
            .iter()
            .find(|r| r.text("label") == Some("Billing"))
            .unwrap();
        assert_eq!(billing.text("badge_text"), Some("New"));
        assert_eq!(billing.text("badge_class"), None);
    }

    #[tokio::test]
    async fn test_empty_section_writes_no_rows() {
        let backend = MemoryBackend::new();
        let seeder = Seeder::new(backend.clone());
        let dataset = Dataset {
            sections: vec![
                Section {
                    title: "Empty".to_string(),
                    links: vec![],
                },
                Section {
                    title: "Legal".to_string(),
                    links: vec![SectionLink {
                        text: "Privacy".to_string(),
                        href: "/privacy".to_string(),
                    }],
                },
            ],
            ..Dataset::default()
        };

        seeder.run(&dataset).await.unwrap();

        let rows = backend.rows(Table::Sections);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("title"), Some("Legal"));
    }

    #[tokio::test]
    async fn test_flat_seed_inserts_every_unique_record() {
        let backend = MemoryBackend::new();
        let seeder = Seeder::new(backend.clone()).with_concurrency(3);
        let dataset = Dataset {
            nav_items: (0..10).map(|i| nav_item(&format!("/page-{i}"))).collect(),
            ..Dataset::default()
        };

        let summary = seeder.run(&dataset).await.unwrap();

        assert_eq!(backend.row_count(Table::NavItems), 10);
        assert_eq!(
            summary.get(Table::NavItems),
            KindSummary {
                attempted: 10,
                inserted: 10
            }
        );
    }

    #[tokio::test]
    async fn test_flat_seed_skips_duplicates_within_run() {
        let backend = MemoryBackend::new();
        let seeder = Seeder::new(backend.clone());
        let dataset = Dataset {
            nav_items: vec![nav_item("/"), nav_item("/"), nav_item("/blog")],
            ..Dataset::default()
        };

        let summary = seeder.run(&dataset).await.unwrap();

        assert_eq!(backend.row_count(Table::NavItems), 2);
        assert_eq!(summary.get(Table::NavItems).skipped(), 1);
    }

    #[tokio::test]
    async fn test_failure_rolls_back_whole_run() {
        let backend = MemoryBackend::new();
        backend.fail_inserts_into(Table::Features);
        let seeder = Seeder::new(backend.clone());

        let result = seeder.run(&Dataset::builtin().unwrap()).await;

        assert!(matches!(result, Err(SeedError::Storage(_))));
        for table in Table::ALL {
            assert_eq!(backend.row_count(table), 0, "{table} kept rows");
            assert!(!backend.has_table(table), "{table} was created");
        }
    }

    #[tokio::test]
    async fn test_summary_serializes_by_table_name() {
        let backend = MemoryBackend::new();
        let seeder = Seeder::new(backend);
        let dataset = Dataset {
            nav_items: vec![nav_item("/")],
            ..Dataset::default()
        };

        let summary = seeder.run(&dataset).await.unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["nav_items"]["attempted"], 1);
        assert_eq!(json["nav_items"]["inserted"], 1);
        assert_eq!(json["menu_items"]["attempted"], 0);
    }

    #[tokio::test]
    async fn test_label_only_and_hrefless_entries_degrade() {
        let backend = MemoryBackend::new();
        let seeder = Seeder::new(backend.clone());
        let dataset = Dataset {
            menu_items: vec![MenuItem {
                id: 3,
                label: "Resources".to_string(),
                href: None,
                sub_items: vec![
                    SubItem::Label(MenuLabel {
                        label: "Divider".to_string(),
                    }),
                    SubItem::Group(MenuGroup {
                        label: "Guides".to_string(),
                        sub_items: vec![MenuLink {
                            label: "Coming Soon".to_string(),
                            href: None,
                        }],
                    }),
                ],
            }],
            ..Dataset::default()
        };

        let summary = seeder.run(&dataset).await.unwrap();

        assert_eq!(summary.get(Table::MenuItems).attempted, 3);
        assert!(
            backend
                .rows(Table::MenuItems)
                .iter()
                .all(|r| r.text("label") != Some("Divider"))
        );
        let guides = row_by_label(&backend, "Guides");
        let soon = row_by_label(&backend, "Coming Soon");
        assert_eq!(soon.text("href"), None);
        assert_eq!(soon.uuid("parent_id"), Some(guides.id));
    }

    #[tokio::test]
    async fn test_empty_optional_strings_stored_as_null() {
        let backend = MemoryBackend::new();
        let seeder = Seeder::new(backend.clone());
        let dataset = Dataset {
            menu_items: vec![MenuItem {
                id: 1,
                label: "Home".to_string(),
                href: Some(String::new()),
                sub_items: vec![],
            }],
            pages: vec![PageGroup {
                id: 1,
                header: "Company".to_string(),
                items: vec![PageItem {
                    href: "/press".to_string(),
                    label: "Press".to_string(),
                    badge: Some(Badge {
                        text: Some(String::new()),
                        class_name: Some(String::new()),
                    }),
                }],
            }],
            ..Dataset::default()
        };

        seeder.run(&dataset).await.unwrap();

        let home = row_by_label(&backend, "Home");
        assert_eq!(home.get("href"), Some(&Value::Text(None)));
        let press = &backend.rows(Table::Pages)[0];
        assert_eq!(press.get("badge_text"), Some(&Value::Text(None)));
        assert_eq!(press.get("badge_class"), Some(&Value::Text(None)));
    }
}
