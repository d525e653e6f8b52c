//! Table definitions for the seeded navigation content.
//!
//! Every table carries a generated `id` and a `created_at` timestamp. No
//! foreign keys are declared; menu hierarchy lives in a plain nullable
//! `parent_id` column. Each table has an explicit unique index that the
//! skip-on-conflict inserts rely on.

use std::fmt;

use serde::Serialize;

/// The nine record kinds, in seeding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    MenuItems,
    Pages,
    NavItems,
    MainPages,
    Features,
    HomeLinks,
    OtherMenuItems,
    SocialIcons,
    Sections,
}

impl Table {
    pub const ALL: [Table; 9] = [
        Table::MenuItems,
        Table::Pages,
        Table::NavItems,
        Table::MainPages,
        Table::Features,
        Table::HomeLinks,
        Table::OtherMenuItems,
        Table::SocialIcons,
        Table::Sections,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::MenuItems => "menu_items",
            Table::Pages => "pages",
            Table::NavItems => "nav_items",
            Table::MainPages => "main_pages",
            Table::Features => "features",
            Table::HomeLinks => "home_links",
            Table::OtherMenuItems => "other_menu_items",
            Table::SocialIcons => "social_icons",
            Table::Sections => "sections",
        }
    }

    /// Column definitions besides `id` and `created_at`.
    fn column_defs(&self) -> &'static str {
        match self {
            Table::MenuItems => {
                r#"
                menu_id INT NOT NULL,
                label VARCHAR(255) NOT NULL,
                href VARCHAR(255),
                parent_id UUID,"#
            }
            Table::Pages => {
                r#"
                page_id INT NOT NULL,
                header VARCHAR(255) NOT NULL,
                href VARCHAR(255) NOT NULL,
                label VARCHAR(255) NOT NULL,
                badge_text VARCHAR(50),
                badge_class VARCHAR(100),"#
            }
            Table::NavItems => {
                r#"
                href VARCHAR(255) NOT NULL,
                label VARCHAR(255) NOT NULL,
                active BOOLEAN DEFAULT FALSE,"#
            }
            Table::MainPages => {
                r#"
                href VARCHAR(255) NOT NULL,
                alt VARCHAR(255) NOT NULL,
                src VARCHAR(500) NOT NULL,
                title VARCHAR(255) NOT NULL,"#
            }
            Table::Features => {
                r#"
                feature_id INT NOT NULL,
                icon_class VARCHAR(255) NOT NULL,
                title VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,"#
            }
            Table::HomeLinks => {
                r#"
                link_id INT NOT NULL,
                href VARCHAR(255) NOT NULL,
                img_alt VARCHAR(255) NOT NULL,
                img_src VARCHAR(500) NOT NULL,
                label VARCHAR(255) NOT NULL,"#
            }
            Table::OtherMenuItems => {
                r#"
                href VARCHAR(255) NOT NULL,
                icon VARCHAR(255) NOT NULL,
                title VARCHAR(255) NOT NULL,"#
            }
            Table::SocialIcons => {
                r#"
                href VARCHAR(255) NOT NULL,
                icon_class VARCHAR(255) NOT NULL,"#
            }
            Table::Sections => {
                r#"
                title VARCHAR(255) NOT NULL,
                link_text VARCHAR(255) NOT NULL,
                link_href VARCHAR(255) NOT NULL,"#
            }
        }
    }

    /// Columns identifying a row for deduplication.
    ///
    /// NULLs compare equal within a key, so a menu group node without an
    /// `href` still conflicts with itself on a re-run.
    pub fn unique_key(&self) -> &'static [&'static str] {
        match self {
            Table::MenuItems => &["menu_id", "label", "href"],
            Table::Pages => &["page_id", "href", "label"],
            Table::NavItems => &["href"],
            Table::MainPages => &["href"],
            Table::Features => &["feature_id"],
            Table::HomeLinks => &["link_id"],
            Table::OtherMenuItems => &["href"],
            Table::SocialIcons => &["href"],
            Table::Sections => &["title", "link_href"],
        }
    }

    /// Columns that must never be NULL.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Table::MenuItems => &["menu_id", "label"],
            Table::Pages => &["page_id", "header", "href", "label"],
            Table::NavItems => &["href", "label"],
            Table::MainPages => &["href", "alt", "src", "title"],
            Table::Features => &["feature_id", "icon_class", "title", "description"],
            Table::HomeLinks => &["link_id", "href", "img_alt", "img_src", "label"],
            Table::OtherMenuItems => &["href", "icon", "title"],
            Table::SocialIcons => &["href", "icon_class"],
            Table::Sections => &["title", "link_text", "link_href"],
        }
    }

    pub fn create_sql(&self) -> String {
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID DEFAULT gen_random_uuid() PRIMARY KEY,{}
                created_at TIMESTAMP DEFAULT NOW()
            )
            "#,
            self.name(),
            self.column_defs(),
        )
    }

    pub fn unique_index_sql(&self) -> String {
        let columns: Vec<String> = self
            .unique_key()
            .iter()
            .map(|column| {
                if self.is_nullable(column) {
                    format!("COALESCE({column}, '')")
                } else {
                    column.to_string()
                }
            })
            .collect();

        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {name}_seed_key ON {name} ({columns})",
            name = self.name(),
            columns = columns.join(", "),
        )
    }

    pub fn is_nullable(&self, column: &str) -> bool {
        !self.required_columns().contains(&column)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
