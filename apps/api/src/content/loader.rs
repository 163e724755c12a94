use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::content::collection::parse_collection;
use crate::content::document::parse_document;
use crate::content::models::{About, Experience, Hero, Project, Section, SkillCategory};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Content not ready: {0} is missing")]
    NotReady(&'static str),
}

/// Everything the landing page renders, loaded in one pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub hero: Hero,
    pub about: About,
    pub experiences: Vec<Experience>,
    pub skill_categories: Vec<SkillCategory>,
    pub projects: Vec<Project>,
}

/// Read-only view over the content directory. Every call reads the files
/// fresh; nothing is cached.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn load_hero(&self) -> Result<Option<Hero>, ContentError> {
        self.load_single().await
    }

    pub async fn load_about(&self) -> Result<Option<About>, ContentError> {
        self.load_single().await
    }

    pub async fn load_experiences(&self) -> Result<Vec<Experience>, ContentError> {
        self.load_collection().await
    }

    pub async fn load_skill_categories(&self) -> Result<Vec<SkillCategory>, ContentError> {
        self.load_collection().await
    }

    /// Loads projects, keeping only those whose `featured` flag matches when a
    /// filter is given.
    pub async fn load_projects(
        &self,
        featured: Option<bool>,
    ) -> Result<Vec<Project>, ContentError> {
        let projects: Vec<Project> = self.load_collection().await?;
        Ok(match featured {
            Some(want) => projects.into_iter().filter(|p| p.featured == want).collect(),
            None => projects,
        })
    }

    /// Loads all sections concurrently. Hero and about are mandatory.
    pub async fn load_page(&self) -> Result<PageContent, ContentError> {
        let (hero, about, experiences, skill_categories, projects) = tokio::try_join!(
            self.load_hero(),
            self.load_about(),
            self.load_experiences(),
            self.load_skill_categories(),
            self.load_projects(None),
        )?;

        let hero = hero.ok_or(ContentError::NotReady(Hero::FILE_NAME))?;
        let about = about.ok_or(ContentError::NotReady(About::FILE_NAME))?;

        Ok(PageContent {
            hero,
            about,
            experiences,
            skill_categories,
            projects,
        })
    }

    async fn load_single<T: Section>(&self) -> Result<Option<T>, ContentError> {
        let Some(text) = self.read(T::FILE_NAME).await? else {
            warn!("Content file {} not found in {}", T::FILE_NAME, self.root.display());
            return Ok(None);
        };

        let record = T::from_document(&parse_document(&text));
        if record.is_none() {
            warn!("Content file {} has no metadata block", T::FILE_NAME);
        }
        Ok(record)
    }

    async fn load_collection<T: Section>(&self) -> Result<Vec<T>, ContentError> {
        let Some(text) = self.read(T::FILE_NAME).await? else {
            debug!("Optional content file {} not found", T::FILE_NAME);
            return Ok(Vec::new());
        };

        let documents = parse_collection(&text);
        let mut records: Vec<T> = documents.iter().filter_map(T::from_document).collect();
        if records.len() < documents.len() {
            warn!(
                "Dropped {} malformed document(s) from {}",
                documents.len() - records.len(),
                T::FILE_NAME
            );
        }

        // Stable: equal orders keep file order.
        records.sort_by_key(|r| r.order());
        Ok(records)
    }

    async fn read(&self, file_name: &str) -> Result<Option<String>, ContentError> {
        let path = self.root.join(file_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(String::from_utf8(bytes).unwrap_or_else(|e| {
                warn!("{} is not valid UTF-8; replacing invalid bytes", path.display());
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ContentError::Io { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const HERO: &str = "---
name: Ada Lovelace
title: Senior Frontend Developer
location: London
email: ada@example.com
linkedInUrl: https://www.linkedin.com/in/ada
profileImage: /Profile_bw.jpg
profileImageTitle: Ada Lovelace
---
";

    const ABOUT: &str = "---
title: Professional Summary
---

Engineer with a taste for analytical engines.
";

    const EXPERIENCES: &str = "---
company: Globex
position: Lead
location: Remote
startDate: 2022-01-01
endDate:
isCurrent: true
order: 1
---

Ran the platform group.

## Achievements

- Cut costs
- Hired the team

---

---
company: Acme
position: Engineer
location: Berlin
startDate: 2019-05
endDate: 2021-12
isCurrent: false
order: 2
---

Wrote the compiler.
";

    fn store_with(files: &[(&str, &str)]) -> (TempDir, ContentStore) {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            std::fs::write(dir.path().join(name), contents).unwrap();
        }
        let store = ContentStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_load_hero() {
        let (_dir, store) = store_with(&[("hero.md", HERO)]);
        let hero = store.load_hero().await.unwrap().unwrap();
        assert_eq!(hero.name, "Ada Lovelace");
        assert_eq!(hero.linked_in_url, "https://www.linkedin.com/in/ada");
        assert_eq!(hero.profile_image.unwrap().url, "/Profile_bw.jpg");
    }

    #[tokio::test]
    async fn test_missing_hero_is_none() {
        let (_dir, store) = store_with(&[]);
        assert!(store.load_hero().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_about_is_none() {
        let (_dir, store) = store_with(&[("about.md", "Just prose, no metadata.")]);
        assert!(store.load_about().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_experiences() {
        let (_dir, store) = store_with(&[("experiences.md", EXPERIENCES)]);
        let experiences = store.load_experiences().await.unwrap();
        assert_eq!(experiences.len(), 2);

        let current = &experiences[0];
        assert_eq!(current.company, "Globex");
        assert!(current.is_current);
        assert_eq!(current.description, "Ran the platform group.");
        assert_eq!(current.achievements, vec!["Cut costs", "Hired the team"]);

        let past = &experiences[1];
        assert_eq!(past.start_date, NaiveDate::from_ymd_opt(2019, 5, 1).unwrap());
        assert_eq!(past.end_date, NaiveDate::from_ymd_opt(2021, 12, 1));
        assert!(!past.is_current);
        assert!(past.achievements.is_empty());
    }

    #[tokio::test]
    async fn test_missing_experiences_is_empty() {
        let (_dir, store) = store_with(&[]);
        assert!(store.load_experiences().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_collection_is_empty() {
        let (_dir, store) = store_with(&[("skills.md", "\n\n")]);
        assert!(store.load_skill_categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sort_is_stable_on_order_ties() {
        let skills = "---
categoryName: Second
order: 2
---

---
categoryName: First A
order: 1
---

---
categoryName: First B
order: 1
---

---
categoryName: Unordered
skills: Go, Rust
---
";
        let (_dir, store) = store_with(&[("skills.md", skills)]);
        let names: Vec<String> = store
            .load_skill_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.category_name)
            .collect();
        assert_eq!(names, vec!["Unordered", "First A", "First B", "Second"]);
    }

    #[tokio::test]
    async fn test_skill_encodings() {
        let skills = "---
categoryName: Languages
skills: [\"Go\",\"Rust\"]
order: 1
---

---
categoryName: Tools
skills: \"Docker, Git\"
order: 2
---
";
        let (_dir, store) = store_with(&[("skills.md", skills)]);
        let categories = store.load_skill_categories().await.unwrap();
        assert_eq!(categories[0].skills, vec!["Go", "Rust"]);
        assert_eq!(categories[1].skills, vec!["Docker", "Git"]);
    }

    #[tokio::test]
    async fn test_featured_filter() {
        let projects = "---
title: Big
featured: true
order: 1
---

The big one.

---

---
title: Small
featured: false
order: 2
---
";
        let (_dir, store) = store_with(&[("projects.md", projects)]);
        assert_eq!(store.load_projects(None).await.unwrap().len(), 2);

        let featured = store.load_projects(Some(true)).await.unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].title, "Big");
        assert_eq!(featured[0].description, "The big one.");

        let rest = store.load_projects(Some(false)).await.unwrap();
        assert_eq!(rest[0].title, "Small");
    }

    #[tokio::test]
    async fn test_malformed_experience_does_not_affect_siblings() {
        let experiences = "---
company: No Dates
order: 1
---

---
company: Acme
startDate: 2020-01
order: 2
---
";
        let (_dir, store) = store_with(&[("experiences.md", experiences)]);
        let loaded = store.load_experiences().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].company, "Acme");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_decoded_lossily() {
        let (dir, store) = store_with(&[("hero.md", HERO), ("about.md", ABOUT)]);
        std::fs::write(
            dir.path().join("projects.md"),
            b"---\ntitle: Caf\xe9\norder: 1\n---\n",
        )
        .unwrap();

        let page = store.load_page().await.unwrap();
        assert_eq!(page.projects.len(), 1);
        assert_eq!(page.projects[0].title, "Caf\u{FFFD}");
    }

    #[tokio::test]
    async fn test_end_dates_drive_is_current() {
        let experiences = "---
company: Finished
startDate: 2019
endDate: 2021
isCurrent: false
order: 1
---

---
company: Unreadable
startDate: 2019-01
endDate: Dec 2021
isCurrent: false
order: 2
---

---
company: Ongoing
startDate: 2022-01
endDate: Present
order: 3
---
";
        let (_dir, store) = store_with(&[("experiences.md", experiences)]);
        let loaded = store.load_experiences().await.unwrap();
        let companies: Vec<&str> = loaded.iter().map(|e| e.company.as_str()).collect();
        assert_eq!(companies, vec!["Finished", "Ongoing"]);

        assert!(!loaded[0].is_current);
        assert_eq!(loaded[0].end_date, NaiveDate::from_ymd_opt(2021, 1, 1));
        assert!(loaded[1].is_current);
        assert_eq!(loaded[1].end_date, None);
    }

    #[tokio::test]
    async fn test_block_list_in_hand_edited_projects() {
        let projects = "---
title: Folio
technologies:
  - Rust
  - axum
order: 2 # pinned
---

Hand-edited.
";
        let (_dir, store) = store_with(&[("projects.md", projects)]);
        let loaded = store.load_projects(None).await.unwrap();
        assert_eq!(loaded[0].technologies, vec!["Rust", "axum"]);
        assert_eq!(loaded[0].order, 2);
        assert_eq!(loaded[0].description, "Hand-edited.");
    }

    #[tokio::test]
    async fn test_load_page() {
        let (_dir, store) = store_with(&[
            ("hero.md", HERO),
            ("about.md", ABOUT),
            ("experiences.md", EXPERIENCES),
        ]);
        let page = store.load_page().await.unwrap();
        assert_eq!(page.about.summary, "Engineer with a taste for analytical engines.");
        assert_eq!(page.experiences.len(), 2);
        assert!(page.skill_categories.is_empty());
        assert!(page.projects.is_empty());
    }

    #[tokio::test]
    async fn test_load_page_without_about_is_not_ready() {
        let (_dir, store) = store_with(&[("hero.md", HERO)]);
        let err = store.load_page().await.unwrap_err();
        assert!(matches!(err, ContentError::NotReady("about.md")));
    }

    #[tokio::test]
    async fn test_bundled_sample_content() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../content");
        let page = ContentStore::new(root).load_page().await.unwrap();
        assert_eq!(page.hero.name, "Jane Doe");
        assert_eq!(page.experiences.len(), 2);
        assert!(page.experiences[0].is_current);
        assert_eq!(page.experiences[0].achievements.len(), 2);
        assert_eq!(page.skill_categories[0].skills, vec!["TypeScript", "Rust", "SQL"]);
        assert_eq!(page.projects[0].technologies, vec!["Rust", "axum"]);
        assert_eq!(
            page.projects[0].image.as_ref().and_then(|i| i.title.as_deref()),
            Some("Portfolio")
        );
    }

    #[tokio::test]
    async fn test_unreadable_path_is_an_error() {
        let (dir, store) = store_with(&[]);
        std::fs::create_dir(dir.path().join("projects.md")).unwrap();
        assert!(matches!(
            store.load_projects(None).await,
            Err(ContentError::Io { .. })
        ));
    }
}
