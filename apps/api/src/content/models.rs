use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::document::RawDocument;
use crate::content::fields::{self, PRESENT};

/// Heading that separates an experience description from its achievements.
pub const ACHIEVEMENTS_MARKER: &str = "## Achievements";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRef {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub name: String,
    pub title: String,
    pub location: String,
    pub email: String,
    pub linked_in_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<ImageRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct About {
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub description: String,
    pub achievements: Vec<String>,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkillCategory {
    pub category_name: String,
    pub skills: Vec<String>,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub image: Option<ImageRef>,
    pub featured: bool,
    pub order: i64,
}

/// A record type backed by one file in the content directory.
///
/// `from_document` returns `None` for a document that lacks the structure the
/// record needs; loaders drop such documents and keep their siblings.
///
/// Loading normalizes: an image without a title takes the record's name or
/// title. Records that came out of `from_document` survive `to_document` and
/// back unchanged; a hand-built record with an untitled image comes back with
/// that fallback title filled in.
pub trait Section: Sized {
    const FILE_NAME: &'static str;

    fn from_document(doc: &RawDocument) -> Option<Self>;

    fn to_document(&self) -> RawDocument;

    fn order(&self) -> i64 {
        0
    }
}

impl Section for Hero {
    const FILE_NAME: &'static str = "hero.md";

    fn from_document(doc: &RawDocument) -> Option<Self> {
        if doc.is_empty() {
            return None;
        }
        let name = fields::text_or_empty(doc, "name");
        let profile_image =
            fields::image(doc, "profileImage", "profileImageTitle", Some(name.as_str()));
        Some(Hero {
            title: fields::text_or_empty(doc, "title"),
            location: fields::text_or_empty(doc, "location"),
            email: fields::text_or_empty(doc, "email"),
            linked_in_url: fields::text_or_empty(doc, "linkedInUrl"),
            profile_image,
            name,
        })
    }

    fn to_document(&self) -> RawDocument {
        let mut doc = RawDocument::new();
        doc.set("name", self.name.as_str());
        doc.set("title", self.title.as_str());
        doc.set("location", self.location.as_str());
        doc.set("email", self.email.as_str());
        doc.set("linkedInUrl", self.linked_in_url.as_str());
        if let Some(image) = &self.profile_image {
            doc.set("profileImage", image.url.as_str());
            if let Some(title) = &image.title {
                doc.set("profileImageTitle", title.as_str());
            }
        }
        doc
    }
}

impl Section for About {
    const FILE_NAME: &'static str = "about.md";

    fn from_document(doc: &RawDocument) -> Option<Self> {
        if doc.is_empty() {
            return None;
        }
        let summary = if doc.body.is_empty() {
            fields::text_or_empty(doc, "summary")
        } else {
            doc.body.clone()
        };
        Some(About {
            title: fields::text_or_empty(doc, "title"),
            summary,
        })
    }

    fn to_document(&self) -> RawDocument {
        let mut doc = RawDocument::new().with_body(self.summary.as_str());
        doc.set("title", self.title.as_str());
        doc
    }
}

impl Section for Experience {
    const FILE_NAME: &'static str = "experiences.md";

    fn from_document(doc: &RawDocument) -> Option<Self> {
        let Some(start_date) = fields::text(doc, "startDate").and_then(|s| fields::date(&s)) else {
            tracing::warn!(
                "Skipping experience at {:?}: missing or invalid startDate",
                fields::text(doc, "company")
            );
            return None;
        };
        let end_date = match fields::end_date(doc, "endDate") {
            Ok(end_date) => end_date,
            Err(raw) => {
                tracing::warn!(
                    "Skipping experience at {:?}: unreadable endDate {raw:?}",
                    fields::text(doc, "company")
                );
                return None;
            }
        };
        let (description, achievements) = split_achievements(&doc.body);

        Some(Experience {
            company: fields::text_or_empty(doc, "company"),
            position: fields::text_or_empty(doc, "position"),
            location: fields::text_or_empty(doc, "location"),
            start_date,
            is_current: end_date.is_none(),
            end_date,
            description,
            achievements,
            order: fields::order(doc),
        })
    }

    fn to_document(&self) -> RawDocument {
        let mut body = self.description.clone();
        if !self.achievements.is_empty() {
            let bullets: Vec<String> = self.achievements.iter().map(|a| format!("- {a}")).collect();
            body = format!("{body}\n\n{ACHIEVEMENTS_MARKER}\n\n{}", bullets.join("\n"));
        }

        let mut doc = RawDocument::new().with_body(body);
        doc.set("company", self.company.as_str());
        doc.set("position", self.position.as_str());
        doc.set("location", self.location.as_str());
        doc.set("startDate", self.start_date.format("%Y-%m-%d").to_string());
        match self.end_date {
            Some(end) => doc.set("endDate", end.format("%Y-%m-%d").to_string()),
            None => doc.set("endDate", PRESENT),
        }
        doc.set("isCurrent", self.is_current);
        doc.set("order", self.order);
        doc
    }

    fn order(&self) -> i64 {
        self.order
    }
}

impl Section for SkillCategory {
    const FILE_NAME: &'static str = "skills.md";

    fn from_document(doc: &RawDocument) -> Option<Self> {
        Some(SkillCategory {
            category_name: fields::text_or_empty(doc, "categoryName"),
            skills: fields::string_list(doc, "skills"),
            order: fields::order(doc),
        })
    }

    fn to_document(&self) -> RawDocument {
        let mut doc = RawDocument::new();
        doc.set("categoryName", self.category_name.as_str());
        doc.set("skills", list_value(&self.skills));
        doc.set("order", self.order);
        doc
    }

    fn order(&self) -> i64 {
        self.order
    }
}

impl Section for Project {
    const FILE_NAME: &'static str = "projects.md";

    fn from_document(doc: &RawDocument) -> Option<Self> {
        let title = fields::text_or_empty(doc, "title");
        let description = if doc.body.is_empty() {
            fields::text_or_empty(doc, "description")
        } else {
            doc.body.clone()
        };
        let image = fields::image(doc, "imageUrl", "imageTitle", Some(title.as_str()))
            .or_else(|| fields::image(doc, "image", "imageTitle", Some(title.as_str())));

        Some(Project {
            description,
            technologies: fields::string_list(doc, "technologies"),
            project_url: fields::text(doc, "projectUrl"),
            github_url: fields::text(doc, "githubUrl"),
            image,
            featured: fields::flag(doc, "featured"),
            order: fields::order(doc),
            title,
        })
    }

    fn to_document(&self) -> RawDocument {
        let mut doc = RawDocument::new().with_body(self.description.as_str());
        doc.set("title", self.title.as_str());
        doc.set("technologies", list_value(&self.technologies));
        if let Some(url) = &self.project_url {
            doc.set("projectUrl", url.as_str());
        }
        if let Some(url) = &self.github_url {
            doc.set("githubUrl", url.as_str());
        }
        if let Some(image) = &self.image {
            doc.set("imageUrl", image.url.as_str());
            if let Some(title) = &image.title {
                doc.set("imageTitle", title.as_str());
            }
        }
        doc.set("featured", self.featured);
        doc.set("order", self.order);
        doc
    }

    fn order(&self) -> i64 {
        self.order
    }
}

/// Splits an experience body at the achievements heading into the description
/// and the bullet lines that follow it.
pub fn split_achievements(body: &str) -> (String, Vec<String>) {
    let Some((description, rest)) = body.split_once(ACHIEVEMENTS_MARKER) else {
        return (body.trim().to_string(), Vec::new());
    };

    let achievements = rest
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .unwrap_or(line)
                .trim()
                .to_string()
        })
        .collect();

    (description.trim().to_string(), achievements)
}

fn list_value(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}
