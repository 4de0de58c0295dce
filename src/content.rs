use serde::Deserialize;
use std::fmt;

const EMBEDDED_CONTENT: &str = include_str!("../content/portfolio.json");

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub profile: Profile,
    pub about: Vec<String>,
    pub highlights: Vec<Highlight>,
    pub projects: Vec<Project>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<SkillCategory>,
    pub contact: Contact,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub headline: String,
    pub tagline: String,
}

impl Profile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Highlight {
    pub value: String,
    pub label: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Development,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Development => "In Development",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Project {
    pub title: String,
    pub status: ProjectStatus,
    pub description: String,
    pub technologies: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub location: String,
    pub period: String,
    pub responsibilities: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub period: String,
    #[serde(default)]
    pub courses: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SkillCategory {
    pub name: String,
    pub items: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Contact {
    pub intro: String,
    pub links: Vec<ContactLink>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Email,
    Phone,
    Linkedin,
    Location,
}

impl ContactKind {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Email => "✉",
            Self::Phone => "📞",
            Self::Linkedin => "💼",
            Self::Location => "📍",
        }
    }

    pub fn opens_new_tab(self) -> bool {
        matches!(self, Self::Linkedin)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ContactLink {
    pub kind: ContactKind,
    pub label: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug)]
pub enum ContentError {
    Parse(serde_json::Error),
    NoProjects,
    EmptyTitle { section: &'static str, index: usize },
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(error) => write!(f, "content document is not valid: {error}"),
            Self::NoProjects => f.write_str("content document lists no projects"),
            Self::EmptyTitle { section, index } => {
                write!(f, "{section} entry {index} has an empty title")
            }
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(error) => Some(error),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error)
    }
}

impl Portfolio {
    pub fn embedded() -> Result<Self, ContentError> {
        Self::from_json(EMBEDDED_CONTENT)
    }

    pub fn from_json(document: &str) -> Result<Self, ContentError> {
        let portfolio: Portfolio = serde_json::from_str(document)?;
        portfolio.validate()?;
        Ok(portfolio)
    }

    fn validate(&self) -> Result<(), ContentError> {
        if self.projects.is_empty() {
            return Err(ContentError::NoProjects);
        }

        let titles = self
            .projects
            .iter()
            .map(|project| ("projects", project.title.as_str()))
            .chain(self.experience.iter().map(|entry| ("experience", entry.title.as_str())))
            .chain(self.education.iter().map(|entry| ("education", entry.degree.as_str())))
            .chain(self.skills.iter().map(|category| ("skills", category.name.as_str())));

        let mut last_section = "";
        let mut index = 0;
        for (section, title) in titles {
            if section != last_section {
                last_section = section;
                index = 0;
            }
            if title.trim().is_empty() {
                return Err(ContentError::EmptyTitle { section, index });
            }
            index += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_document_loads() {
        let portfolio = Portfolio::embedded().expect("embedded content should parse");

        assert_eq!(portfolio.profile.full_name(), "Moayed Abdalla");
        assert_eq!(portfolio.projects.len(), 5);
        assert_eq!(portfolio.projects[0].status, ProjectStatus::Development);
        assert_eq!(portfolio.experience[0].company, "Impact Fundry");
        assert_eq!(portfolio.skills.first().map(|c| c.name.as_str()), Some("Data Engineering"));
        assert!(portfolio
            .contact
            .links
            .iter()
            .any(|link| link.kind == ContactKind::Location && link.href.is_none()));
    }

    #[test]
    fn education_courses_are_optional() {
        let document = r#"{
            "profile": {"firstName": "A", "lastName": "B", "headline": "h", "tagline": "t"},
            "about": [], "highlights": [],
            "projects": [{"title": "P", "status": "completed", "description": "d", "technologies": []}],
            "experience": [],
            "education": [{"degree": "BSc", "institution": "U", "period": "2020"}],
            "skills": [],
            "contact": {"intro": "hi", "links": []}
        }"#;

        let portfolio = Portfolio::from_json(document).expect("document should parse");
        assert_eq!(portfolio.education[0].courses, None);
    }

    #[test]
    fn document_without_projects_is_rejected() {
        let document = r#"{
            "profile": {"firstName": "A", "lastName": "B", "headline": "h", "tagline": "t"},
            "about": [], "highlights": [], "projects": [], "experience": [],
            "education": [], "skills": [], "contact": {"intro": "", "links": []}
        }"#;

        let result = Portfolio::from_json(document);
        assert!(matches!(result, Err(ContentError::NoProjects)));
    }

    #[test]
    fn blank_experience_title_reports_its_position() {
        let document = r#"{
            "profile": {"firstName": "A", "lastName": "B", "headline": "h", "tagline": "t"},
            "about": [], "highlights": [],
            "projects": [{"title": "P", "status": "development", "description": "d", "technologies": []}],
            "experience": [
                {"title": "Dev", "company": "C", "location": "L", "period": "p", "responsibilities": []},
                {"title": "  ", "company": "C", "location": "L", "period": "p", "responsibilities": []}
            ],
            "education": [], "skills": [], "contact": {"intro": "", "links": []}
        }"#;

        let result = Portfolio::from_json(document);
        assert!(matches!(
            result,
            Err(ContentError::EmptyTitle { section: "experience", index: 1 })
        ));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let result = Portfolio::from_json(r#"{"profile": 1}"#);
        assert!(matches!(result, Err(ContentError::Parse(_))));
    }
}
