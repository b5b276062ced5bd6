use serde::Deserialize;

// Contents API: one entry of a directory listing
#[derive(Debug, Deserialize, Clone)]
pub struct ContentEntryDto {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String, // "file", "dir", "symlink", "submodule"
}

impl ContentEntryDto {
    pub fn is_dir(&self) -> bool {
        self.kind == "dir"
    }

    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }
}

// Contents API: a single file
#[derive(Debug, Deserialize)]
pub struct FileContentDto {
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: String,
}
