use std::io::Read;
use std::path::{Path, PathBuf};

use tpar::task::TaskContext;

use Result;

/// Parser configuration.
#[derive(Debug, Deserialize, Eq, PartialEq)]
pub struct Config {
    pub corpora: Corpora,
    pub parser: Parser,
    pub lookups: Lookups,
    pub features: Features,
}

#[derive(Debug, Deserialize, Eq, PartialEq)]
pub struct Corpora {
    pub train: String,
}

#[derive(Debug, Deserialize, Eq, PartialEq)]
pub struct Parser {
    #[serde(default = "default_system")]
    pub system: String,
    #[serde(default = "default_arg_prefix")]
    pub arg_prefix: String,
    pub batch_size: usize,
    #[serde(default)]
    pub scoring: String,
    #[serde(default)]
    pub pproj: bool,
}

#[derive(Debug, Deserialize, Eq, PartialEq)]
pub struct Lookups {
    pub label_map: String,
    pub word_map: String,
    pub tag_map: String,
}

#[derive(Debug, Deserialize, Eq, PartialEq)]
pub struct Features {
    pub embedding_names: String,
    pub embedding_dims: String,
    pub templates: String,
}

fn default_system() -> String {
    String::from("arc-standard")
}

fn default_arg_prefix() -> String {
    String::from("parser")
}

impl Config {
    /// Make the paths in the configuration relative to the configuration
    /// file's directory.
    pub fn relativize_paths<P>(&mut self, config_path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let config_path = config_path.as_ref();
        let parent = config_path.parent().ok_or_else(|| {
            format_err!(
                "cannot determine parent directory of: {}",
                config_path.display()
            )
        })?;

        self.corpora.train = relativize(parent, &self.corpora.train);
        self.lookups.label_map = relativize(parent, &self.lookups.label_map);
        self.lookups.word_map = relativize(parent, &self.lookups.word_map);
        self.lookups.tag_map = relativize(parent, &self.lookups.tag_map);

        Ok(())
    }

    /// The number of feature groups this configuration declares.
    pub fn num_feature_groups(&self) -> usize {
        self.features.embedding_names.split(';').count()
    }

    /// Lower the configuration into a task context.
    pub fn to_task_context(&self) -> TaskContext {
        let prefix = &self.parser.arg_prefix;

        let mut context = TaskContext::new();
        context.set_param("transition_system", self.parser.system.as_str());
        context.set_param(format!("{}_scoring", prefix), self.parser.scoring.as_str());
        context.set_param(
            format!("{}_embedding_names", prefix),
            self.features.embedding_names.as_str(),
        );
        context.set_param(
            format!("{}_embedding_dims", prefix),
            self.features.embedding_dims.as_str(),
        );
        context.set_param(
            format!("{}_features", prefix),
            self.features.templates.as_str(),
        );

        context.set_input("label-map", self.lookups.label_map.as_str());
        context.set_input("word-map", self.lookups.word_map.as_str());
        context.set_input("tag-map", self.lookups.tag_map.as_str());

        context
    }
}

fn relativize(parent: &Path, path: &str) -> String {
    if Path::new(path).is_absolute() {
        return path.to_owned();
    }

    let mut relativized = PathBuf::from(parent);
    relativized.push(path);
    relativized.to_string_lossy().into_owned()
}

/// Deserialization from TOML.
pub trait TomlRead: Sized {
    fn from_toml_read<R>(read: R) -> Result<Self>
    where
        R: Read;
}

impl TomlRead for Config {
    fn from_toml_read<R>(mut read: R) -> Result<Self>
    where
        R: Read,
    {
        let mut data = String::new();
        read.read_to_string(&mut data)?;
        Ok(toml::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, TomlRead};

    static CONFIG: &str = r#"
[corpora]
train = "corpus/train.conll"

[parser]
batch_size = 32
scoring = "default"
pproj = true

[lookups]
label_map = "lookups/labels.txt"
word_map = "lookups/words.txt"
tag_map = "lookups/tags.txt"

[features]
embedding_names = "words;tags;labels"
embedding_dims = "64;32;32"
templates = "stack(0) buffer(0);stack(0) buffer(0);stack(0).ldep(0)"
"#;

    #[test]
    fn reads_and_lowers_a_configuration() {
        let mut config = Config::from_toml_read(CONFIG.as_bytes()).unwrap();
        assert_eq!(config.parser.system, "arc-standard");
        assert_eq!(config.parser.arg_prefix, "parser");
        assert_eq!(config.parser.batch_size, 32);
        assert!(config.parser.pproj);
        assert_eq!(config.num_feature_groups(), 3);

        config.relativize_paths("conf/parser.toml").unwrap();
        assert_eq!(config.corpora.train, "conf/corpus/train.conll");
        assert_eq!(config.lookups.word_map, "conf/lookups/words.txt");

        let context = config.to_task_context();
        assert_eq!(context.param("transition_system"), Some("arc-standard"));
        assert_eq!(context.param("parser_scoring"), Some("default"));
        assert_eq!(
            context.param("parser_embedding_names"),
            Some("words;tags;labels")
        );
        assert_eq!(
            context.input_path("tag-map").unwrap().to_string_lossy(),
            "conf/lookups/tags.txt"
        );
    }

    #[test]
    fn rejects_incomplete_configurations() {
        assert!(Config::from_toml_read("[corpora]\ntrain = \"t.conll\"\n".as_bytes()).is_err());
    }
}
