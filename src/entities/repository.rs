
#[derive(Debug, Clone, PartialEq)]
pub struct Language {
    pub name: String,
    pub size: Option<u64>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub full_name: String,
    pub url: String,
    pub primary_language: Option<Language>,
    // Ordered by size descending, as returned by GitHub.
    pub languages: Vec<Language>,
}
