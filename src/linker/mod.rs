//! The link resolution engine.
//!
//! [`Linker::link`] takes one declarative link request and deterministically
//! produces filesystem links:
//!
//! 1. validate that at least one of `source`/`content`/`links` is present;
//! 2. resolve `source` (remote URI or literal path) and load its linkspec;
//! 3. apply the override rule: explicit caller fields win wholesale over
//!    the descriptor, never field-by-field;
//! 4. render and bind the target;
//! 5. branch: flat whole-directory link, content-glob selection with
//!    exclusion, or child-package fan-out;
//! 6. process external links, seeding missing default content by copy;
//! 7. realize every resolved link through the filesystem primitive.
//!
//! [`Linker::run`] drives the engine once per declaration of a run
//! configuration, with `forced` always set so re-runs replace the links
//! they created previously.

pub mod hooks;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::{ExternalLinkDeclaration, LinkDeclaration, RunConfig, linkspec};
use crate::error::{ConfigError, LinkerError, SourceError};
use crate::params::{ParamEnv, Reserved};
use crate::resolvers::{Registry, canonical};
use crate::resources::fs::copy_path;
use crate::resources::link::create_link;
use crate::template;

use hooks::LinkTemplate;

/// One link invocation: the caller-supplied declaration fields plus
/// evaluation flags.
#[derive(Debug, Default)]
pub struct LinkRequest {
    /// Source URI or path template.
    pub source: Option<String>,
    /// Target path template.
    pub target: Option<String>,
    /// Content selection glob templates.
    pub content: Option<Vec<String>>,
    /// Exclusion glob templates.
    pub exclude: Option<Vec<String>>,
    /// Child-package fan-out declarations.
    pub links: Option<Vec<LinkDeclaration>>,
    /// External link declarations.
    pub external_links: Option<Vec<ExternalLinkDeclaration>>,
    /// Replace links created by previous runs.
    pub forced: bool,
    /// Rebind `__dir__` to the descriptor directory when one is found.
    pub set_dir: bool,
}

impl LinkRequest {
    /// Build a request from a parsed declaration.
    #[must_use]
    pub fn from_declaration(declaration: &LinkDeclaration, forced: bool, set_dir: bool) -> Self {
        Self {
            source: declaration.source.clone(),
            target: declaration.target.clone(),
            content: declaration.content.clone(),
            exclude: declaration.exclude.clone(),
            links: declaration.links.clone(),
            external_links: declaration.external_links.clone(),
            forced,
            set_dir,
        }
    }
}

/// The engine: resolver registry, parameter environment and the links of
/// a loaded run configuration.
#[derive(Debug)]
pub struct Linker {
    registry: Registry,
    params: ParamEnv,
    links: Vec<LinkDeclaration>,
    template: Option<Box<dyn LinkTemplate>>,
}

impl Linker {
    /// Create an engine with no configuration loaded.
    ///
    /// `__cwd__` is bound immediately; everything else comes from
    /// configuration or direct [`Self::link`] calls.
    #[must_use]
    pub fn new(packages_dir: Option<PathBuf>) -> Self {
        let mut params = ParamEnv::new();
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        params.bind(Reserved::Cwd, cwd.display().to_string());

        Self {
            registry: Registry::new(packages_dir),
            params,
            links: Vec::new(),
            template: None,
        }
    }

    /// Attach a link-template hook.
    #[must_use]
    pub fn with_template(mut self, template: Box<dyn LinkTemplate>) -> Self {
        self.template = Some(template);
        self
    }

    /// Load a run configuration and build its parameter environment.
    ///
    /// Command-line `overrides` are seeded first and recorded as an
    /// exclusion set: a declared parameter of the same name is never
    /// re-expanded. The template hook's expansion runs next, then the
    /// declared parameters in file order, each rendered against
    /// everything defined so far — forward references fail.
    ///
    /// # Errors
    ///
    /// Returns any load, validation, reserved-collision or rendering
    /// error.
    pub fn from_config(
        config_path: &Path,
        overrides: &[(String, String)],
        packages_dir: Option<PathBuf>,
        template: Option<Box<dyn LinkTemplate>>,
    ) -> Result<Self, LinkerError> {
        let config_path = canonical(&config_path.to_string_lossy());
        let config = RunConfig::load(&config_path)?;

        let mut linker = Self::new(packages_dir);
        linker.template = template;

        if let Some(dir) = config_path.parent() {
            linker.params.bind(Reserved::Dir, dir.display().to_string());
        }

        let mut excluded: HashSet<&str> = HashSet::new();
        for (name, value) in overrides {
            linker.params.declare(name, value.clone())?;
            excluded.insert(name.as_str());
        }

        if let Some(hook) = &linker.template {
            hook.expand_params(&mut linker.params)?;
        }

        for (name, raw) in &config.params {
            if excluded.contains(name.as_str()) {
                tracing::debug!("parameter {name} overridden on the command line");
                continue;
            }
            let value = template::render(raw, &linker.params)?;
            linker.params.declare(name, value)?;
        }

        linker.links = config.links;
        Ok(linker)
    }

    /// The current parameter environment.
    #[must_use]
    pub const fn params(&self) -> &ParamEnv {
        &self.params
    }

    /// Process every declared link in order.
    ///
    /// Configuration-driven runs always force: links created by a
    /// previous run are replaced, never duplicated.
    ///
    /// # Errors
    ///
    /// Stops at the first failing declaration and returns its error.
    pub fn run(&self) -> Result<usize, LinkerError> {
        if let Some(hook) = &self.template {
            hook.pre_run(&self.params)?;
        }

        let set_dir = self.params.contains(Reserved::Dir.name());
        let mut created = 0;
        for declaration in &self.links {
            created += self.link(LinkRequest::from_declaration(declaration, true, set_dir))?;
        }
        tracing::info!("{created} links created");
        Ok(created)
    }

    /// Resolve one link request, returning the number of links created.
    ///
    /// # Errors
    ///
    /// Returns the first error hit while resolving or materializing.
    pub fn link(&self, request: LinkRequest) -> Result<usize, LinkerError> {
        self.link_in(request, &self.params)
    }

    /// Resolve one link request against an explicit environment.
    ///
    /// The environment is cloned before any binding, so sibling branches
    /// of a recursive resolution never observe each other's transient
    /// `__source__`/`__target__`/`__dir__` values.
    ///
    /// # Errors
    ///
    /// Returns the first error hit while resolving or materializing.
    pub fn link_in(&self, request: LinkRequest, params: &ParamEnv) -> Result<usize, LinkerError> {
        let LinkRequest {
            source,
            target,
            mut content,
            mut exclude,
            mut links,
            mut external_links,
            forced,
            set_dir,
        } = request;

        if source.is_none() && content.is_none() && links.is_none() {
            return Err(ConfigError::Incomplete.into());
        }

        let mut params = params.clone();
        let mut target = target;
        let mut source_dir: Option<PathBuf> = None;

        if let Some(raw_source) = &source {
            let resolved = match self.registry.match_resolver(raw_source) {
                Some(resolver) => self.registry.resolve_remote(resolver, raw_source)?,
                None => canonical(&template::render(raw_source, &params)?),
            };
            if !resolved.is_dir() {
                return Err(SourceError::NotFound(resolved).into());
            }

            let (spec, spec_path) = linkspec::load(&resolved)?;
            params.bind(Reserved::Source, resolved.display().to_string());
            if set_dir && let Some(spec_path) = &spec_path {
                let dir = spec_path.parent().unwrap_or(&resolved);
                params.bind(Reserved::Dir, dir.display().to_string());
            }

            // The package's own descriptor applies only when the caller
            // supplied none of these fields: explicit wins wholesale.
            if content.is_none()
                && links.is_none()
                && external_links.is_none()
                && exclude.is_none()
            {
                content = spec.content;
                links = spec.links;
                exclude = spec.exclude;
                external_links = spec.external_links;
                target = target.or(spec.target);
            }

            source_dir = Some(resolved);
        }

        let rendered_target = match &target {
            Some(raw) => {
                let rendered = absolute(&template::render(raw, &params)?);
                params.bind(Reserved::Target, rendered.display().to_string());
                params.bind_default_anchor(rendered.display().to_string());
                Some(rendered)
            }
            None => None,
        };

        let mut created = 0;

        if let Some(children) = &links {
            for child in children {
                created += self.link_child(child, source_dir.as_deref(), forced, &params)?;
            }
        } else {
            let target = rendered_target.as_ref().ok_or(ConfigError::MissingTarget)?;
            if let Some(patterns) = &content {
                created += self.link_content(
                    patterns,
                    exclude.as_deref(),
                    source_dir.as_deref(),
                    target,
                    forced,
                    &params,
                )?;
            } else {
                let source_path = source_dir.as_ref().ok_or(ConfigError::Incomplete)?;
                create_link(source_path, target, forced)?;
                created += 1;
            }
        }

        if let Some(externals) = &external_links {
            for external in externals {
                created +=
                    self.link_external(external, source_dir.as_deref(), forced, &params)?;
            }
        }

        Ok(created)
    }

    /// Link every glob match under `target/<basename>`, minus exclusions.
    fn link_content(
        &self,
        patterns: &[String],
        exclude: Option<&[String]>,
        base: Option<&Path>,
        target: &Path,
        forced: bool,
        params: &ParamEnv,
    ) -> Result<usize, LinkerError> {
        let excluded: HashSet<PathBuf> = match exclude {
            Some(patterns) => expand_globs(patterns, base, params)?.into_iter().collect(),
            None => HashSet::new(),
        };

        let mut created = 0;
        for item in expand_globs(patterns, base, params)? {
            if excluded.contains(&item) {
                tracing::debug!("excluded {}", item.display());
                continue;
            }
            let Some(name) = item.file_name() else {
                continue;
            };
            create_link(&item, &target.join(name), forced)?;
            created += 1;
        }
        Ok(created)
    }

    /// Resolve one child declaration of a fan-out.
    fn link_child(
        &self,
        child: &LinkDeclaration,
        parent_source: Option<&Path>,
        forced: bool,
        params: &ParamEnv,
    ) -> Result<usize, LinkerError> {
        let target_template = child
            .target
            .as_ref()
            .ok_or(ConfigError::MissingChildTarget)?;
        let child_target = absolute(&template::render(target_template, params)?);

        // A child's own content selection overrides its source link.
        if let Some(patterns) = &child.content {
            let base = match &child.source {
                Some(raw) => Some(resolve_relative(
                    &template::render(raw, params)?,
                    parent_source,
                )),
                None => parent_source.map(Path::to_path_buf),
            };
            return self.link_content(
                patterns,
                child.exclude.as_deref(),
                base.as_deref(),
                &child_target,
                forced,
                params,
            );
        }

        let source_template = child
            .source
            .as_ref()
            .ok_or(ConfigError::MissingChildSource)?;
        let child_source = resolve_relative(&template::render(source_template, params)?, parent_source);
        create_link(&child_source, &child_target, forced)?;
        Ok(1)
    }

    /// Create one external link and seed its missing default content.
    fn link_external(
        &self,
        external: &ExternalLinkDeclaration,
        source_dir: Option<&Path>,
        forced: bool,
        params: &ParamEnv,
    ) -> Result<usize, LinkerError> {
        let ext_source = absolute(&template::render(&external.source, params)?);
        let ext_target = absolute(&template::render(&external.target, params)?);
        create_link(&ext_source, &ext_target, forced)?;

        if let Some(patterns) = &external.default_content {
            for item in expand_globs(patterns, source_dir, params)? {
                let Some(name) = item.file_name() else {
                    continue;
                };
                let destination = ext_target.join(name);
                if destination.exists() {
                    // Seeding is one-time: existing content is the user's.
                    tracing::debug!("seed already present: {}", destination.display());
                    continue;
                }
                copy_path(&item, &destination)?;
                tracing::info!("seeded {} -> {}", item.display(), destination.display());
            }
        }
        Ok(1)
    }
}

/// Render-then-expand every glob pattern, collecting matches in order.
///
/// Rendered relative patterns resolve against `base` (the governing
/// source directory); patterns matching nothing contribute zero entries,
/// which is how optional content declarations stay silent.
fn expand_globs(
    patterns: &[String],
    base: Option<&Path>,
    params: &ParamEnv,
) -> Result<Vec<PathBuf>, LinkerError> {
    let mut matches = Vec::new();
    for pattern in patterns {
        let rendered = template::render(pattern, params)?;
        let anchored = resolve_relative(&rendered, base);
        let pattern_text = anchored.to_string_lossy().to_string();

        let paths = glob::glob(&pattern_text).map_err(|source| ConfigError::Glob {
            pattern: pattern_text.clone(),
            source,
        })?;
        // Entries that cannot be read are simply not matches.
        matches.extend(paths.flatten());
    }
    Ok(matches)
}

/// Anchor a rendered path: absolute stays as-is, relative joins `base`
/// when given, otherwise the working directory.
fn resolve_relative(rendered: &str, base: Option<&Path>) -> PathBuf {
    let path = Path::new(rendered);
    if path.is_absolute() {
        path.to_path_buf()
    } else if let Some(base) = base {
        base.join(path)
    } else {
        absolute(rendered)
    }
}

/// Lexically absolutize a rendered path against the working directory.
fn absolute(rendered: &str) -> PathBuf {
    let path = Path::new(rendered);
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
