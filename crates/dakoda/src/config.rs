use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::{env, fmt};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{bail, DakodaResult};

/// Default view aliases: the learner text and the target hypothesis.
pub const DEFAULT_VIEWS: [(&str, &str); 2] =
    [("learner", "ctok"), ("target_hypothesis", "mixtral_th1")];

/// Dakoda config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The path of the config.
    #[serde(skip)]
    path: Option<PathBuf>,

    /// Corpus options.
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Aliases of CAS views.
    #[serde(default)]
    pub views: ViewAliases,

    /// Index options.
    #[serde(default)]
    pub index: IndexConfig,

    /// Runtime options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<Runtime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// The corpus used if no corpus is given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndexConfig {
    /// Directory of the index cache. Relative paths are resolved
    /// against the corpus directory; defaults to `.index`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Whether the metadata of a document is cached as JSON next to
    /// its XMI file.
    #[serde(default = "default_true")]
    pub cache_metadata: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            cache_metadata: true,
        }
    }
}

#[inline]
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Runtime {
    /// Number of threads to use. If this options isn't set or a value
    /// of "0" is chosen, the maximum number of available threads
    /// is used.
    pub num_jobs: Option<usize>,
}

/// Maps view aliases (e.g. `learner`) to the names of CAS views.
///
/// The default aliases are always present unless they are overridden.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewAliases(BTreeMap<String, String>);

impl ViewAliases {
    /// Resolves an alias. Names that are not an alias are returned
    /// unchanged.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        if let Some(view) = self.0.get(name) {
            return view;
        }

        DEFAULT_VIEWS
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, view)| *view)
            .unwrap_or(name)
    }

    /// Returns all `(alias, view)` pairs, sorted by alias.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut pairs: BTreeMap<&str, &str> =
            DEFAULT_VIEWS.into_iter().collect();
        for (alias, view) in self.0.iter() {
            pairs.insert(alias.as_str(), view.as_str());
        }

        pairs.into_iter()
    }

    pub fn insert<S: Into<String>>(&mut self, alias: S, view: S) {
        self.0.insert(alias.into(), view.into());
    }

    pub fn remove(&mut self, alias: &str) -> Option<String> {
        self.0.remove(alias)
    }

    /// Returns the explicitly configured view of an alias.
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.0.get(alias).map(String::as_str)
    }
}

impl Config {
    pub const FILENAME: &'static str = "dakoda.toml";
    pub const ENV: &'static str = "DAKODA_CONFIG";

    /// Creates a new default config and sets the file location.
    pub fn create<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: Some(path.as_ref().into()),
            ..Default::default()
        }
    }

    /// Loads an existing config from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> DakodaResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.path = Some(path.into());

        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Locates the config file.
    ///
    /// An explicit path wins over the `DAKODA_CONFIG` environment
    /// variable, which wins over a `dakoda.toml` in the current
    /// directory or any parent directory. The last resort is the
    /// user's config directory.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.into());
        }

        if let Some(path) = env::var_os(Self::ENV) {
            return Some(path.into());
        }

        if let Ok(mut dir) = env::current_dir() {
            loop {
                let candidate = dir.join(Self::FILENAME);
                if candidate.is_file() {
                    return Some(candidate);
                }

                if !dir.pop() {
                    break;
                }
            }
        }

        ProjectDirs::from("org", "DAKODA", "dakoda")
            .map(|dirs| dirs.config_dir().join(Self::FILENAME))
            .filter(|path| path.is_file())
    }

    /// Loads the config as found by [`Config::locate`]. If there is no
    /// config file, the default config is returned.
    pub fn discover(explicit: Option<&Path>) -> DakodaResult<Self> {
        match Self::locate(explicit) {
            Some(path) if path.is_file() => Self::from_path(path),
            Some(path) if explicit.is_some() => {
                bail!("config file {} not found", path.display())
            }
            Some(path) => Ok(Self::create(path)),
            None => Ok(Self::create(Self::FILENAME)),
        }
    }

    /// Returns the location of the config file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Saves the config.
    pub fn save(&self) -> DakodaResult<()> {
        let Some(ref path) = self.path else {
            bail!("config has no file location");
        };

        let content = toml::to_string(self)?;
        let mut out = File::create(path)?;
        out.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Returns the index cache directory of a corpus.
    pub fn cache_dir(&self, corpus_dir: &Path) -> PathBuf {
        match self.index.cache_dir {
            Some(ref dir) if dir.is_absolute() => dir.clone(),
            Some(ref dir) => corpus_dir.join(dir),
            None => corpus_dir.join(".index"),
        }
    }

    pub fn num_jobs(&self) -> usize {
        self.runtime
            .as_ref()
            .and_then(|rt| rt.num_jobs)
            .unwrap_or_default()
    }

    /// Returns the value of a config option.
    pub fn get(&self, key: &str) -> DakodaResult<Option<String>> {
        let value = match ConfigKey::parse(key)? {
            ConfigKey::CorpusPath => self
                .corpus
                .path
                .as_ref()
                .map(|path| path.display().to_string()),
            ConfigKey::CacheDir => self
                .index
                .cache_dir
                .as_ref()
                .map(|path| path.display().to_string()),
            ConfigKey::CacheMetadata => {
                Some(self.index.cache_metadata.to_string())
            }
            ConfigKey::NumJobs => self
                .runtime
                .as_ref()
                .and_then(|rt| rt.num_jobs)
                .map(|n| n.to_string()),
            ConfigKey::View(alias) => {
                let view = self.views.resolve(alias);
                (view != alias).then(|| view.to_string())
            }
        };

        Ok(value)
    }

    /// Sets a config option.
    pub fn set(&mut self, key: &str, value: &str) -> DakodaResult<()> {
        match ConfigKey::parse(key)? {
            ConfigKey::CorpusPath => self.corpus.path = Some(value.into()),
            ConfigKey::CacheDir => self.index.cache_dir = Some(value.into()),
            ConfigKey::CacheMetadata => {
                self.index.cache_metadata = match value {
                    "true" | "yes" | "1" => true,
                    "false" | "no" | "0" => false,
                    _ => bail!("invalid value `{value}`"),
                }
            }
            ConfigKey::NumJobs => {
                let Ok(n) = value.parse::<usize>() else {
                    bail!("invalid value `{value}`");
                };

                self.runtime = Some(Runtime { num_jobs: Some(n) });
            }
            ConfigKey::View(alias) => self.views.insert(alias, value),
        }

        Ok(())
    }

    /// Removes a config option; the default applies afterwards.
    pub fn unset(&mut self, key: &str) -> DakodaResult<()> {
        match ConfigKey::parse(key)? {
            ConfigKey::CorpusPath => self.corpus.path = None,
            ConfigKey::CacheDir => self.index.cache_dir = None,
            ConfigKey::CacheMetadata => self.index.cache_metadata = true,
            ConfigKey::NumJobs => self.runtime = None,
            ConfigKey::View(alias) => {
                self.views.remove(alias);
            }
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ConfigKey<'a> {
    CorpusPath,
    CacheDir,
    CacheMetadata,
    NumJobs,
    View(&'a str),
}

impl<'a> ConfigKey<'a> {
    fn parse(key: &'a str) -> DakodaResult<Self> {
        Ok(match key {
            "corpus.path" => Self::CorpusPath,
            "index.cache-dir" => Self::CacheDir,
            "index.cache-metadata" => Self::CacheMetadata,
            "runtime.num-jobs" => Self::NumJobs,
            key => match key.strip_prefix("views.") {
                Some(alias) if !alias.is_empty() => Self::View(alias),
                _ => bail!("unknown config option `{key}`"),
            },
        })
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match toml::to_string(self) {
            Ok(s) => write!(f, "{s}"),
            Err(_) => Err(fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.index.cache_metadata);
        assert_eq!(config.num_jobs(), 0);
        assert_eq!(config.views.resolve("learner"), "ctok");
        assert_eq!(config.views.resolve("target_hypothesis"), "mixtral_th1");
        assert_eq!(config.views.resolve("ctok"), "ctok");
        assert_eq!(
            config.cache_dir(Path::new("/data/WTLD")),
            PathBuf::from("/data/WTLD/.index")
        );
    }

    #[test]
    fn read_config() -> TestResult {
        let config: Config = toml::from_str(
            r#"
            [corpus]
            path = "/data/ComiGs"

            [views]
            target_hypothesis = "th2"
            normalized = "norm"

            [index]
            cache-dir = "/tmp/cache"
            cache-metadata = false

            [runtime]
            num-jobs = 4
            "#,
        )?;

        assert_eq!(config.corpus.path, Some(PathBuf::from("/data/ComiGs")));
        assert_eq!(config.views.resolve("learner"), "ctok");
        assert_eq!(config.views.resolve("target_hypothesis"), "th2");
        assert_eq!(config.views.resolve("normalized"), "norm");
        assert!(!config.index.cache_metadata);
        assert_eq!(
            config.cache_dir(Path::new("/data")),
            PathBuf::from("/tmp/cache")
        );
        assert_eq!(config.num_jobs(), 4);

        let aliases: Vec<_> = config.views.iter().collect();
        assert_eq!(
            aliases,
            vec![
                ("learner", "ctok"),
                ("normalized", "norm"),
                ("target_hypothesis", "th2")
            ]
        );
        Ok(())
    }

    #[test]
    fn get_set_unset() -> TestResult {
        let mut config = Config::default();

        config.set("runtime.num-jobs", "8")?;
        assert_eq!(config.get("runtime.num-jobs")?, Some("8".into()));
        config.unset("runtime.num-jobs")?;
        assert_eq!(config.get("runtime.num-jobs")?, None);

        config.set("views.learner", "tok")?;
        assert_eq!(config.get("views.learner")?, Some("tok".into()));
        config.unset("views.learner")?;
        assert_eq!(config.get("views.learner")?, Some("ctok".into()));
        assert_eq!(config.get("views.unknown")?, None);

        config.set("index.cache-metadata", "no")?;
        assert_eq!(config.get("index.cache-metadata")?, Some("false".into()));

        assert!(config.set("runtime.num-jobs", "many").is_err());
        assert!(config.get("foo.bar").is_err());
        assert!(config.get("views.").is_err());
        Ok(())
    }

    #[test]
    fn save_and_load() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(Config::FILENAME);

        let mut config = Config::create(&path);
        config.set("corpus.path", "/data/WTLD")?;
        config.save()?;

        let loaded = Config::from_path(&path)?;
        assert_eq!(loaded, config);
        assert_eq!(loaded.path(), Some(path.as_path()));
        Ok(())
    }

    #[test]
    fn discover_explicit_missing() {
        let path = Path::new("/nonexistent/dakoda.toml");
        assert!(Config::discover(Some(path)).is_err());
    }
}
