use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use urlcard::{slugify, Config, Unfurler};

mod cli;

use cli::{Command, ConfigArgs};

fn load_config(args: &ConfigArgs) -> anyhow::Result<Config> {
    let mut config = Config::load_with(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    if let Some(content_root) = &args.content_root {
        config.content_root = content_root.clone();
    }
    if let Some(cache_root) = &args.cache_root {
        config.cache_root = cache_root.clone();
    }
    if let Some(default_image) = &args.default_image {
        config.default_image = Some(default_image.clone());
    }

    Ok(config)
}

fn read_documents(files: &[PathBuf]) -> anyhow::Result<Vec<String>> {
    if files.is_empty() {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read stdin")?;
        return Ok(vec![content]);
    }

    files
        .iter()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))
        })
        .collect()
}

fn output_path(path: &Path, in_place: bool, out_dir: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    if in_place {
        return Ok(Some(path.to_path_buf()));
    }

    let Some(out_dir) = out_dir else {
        return Ok(None);
    };
    let Some(file_name) = path.file_name() else {
        bail!("{} has no file name", path.display());
    };

    Ok(Some(out_dir.join(file_name)))
}

fn render(
    unfurler: &Unfurler,
    files: Vec<PathBuf>,
    in_place: bool,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    unfurler.init().context("failed to create output directories")?;
    if let Some(out_dir) = &out_dir {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;
    }

    let documents = read_documents(&files)?;
    let rendered = unfurler.render_documents(&documents);

    if files.is_empty() {
        for content in rendered {
            let content = content.context("failed to render stdin")?;
            std::io::stdout().write_all(content.as_bytes())?;
        }
        return Ok(());
    }

    let mut failed = 0;
    for (path, content) in files.iter().zip(rendered) {
        let _span = tracing::info_span!("document", path = %path.display()).entered();

        let content = match content {
            Ok(content) => content,
            Err(err) => {
                log::error!("{}: {err}", path.display());
                failed += 1;
                continue;
            }
        };

        match output_path(path, in_place, out_dir.as_deref())? {
            Some(target) => std::fs::write(&target, content)
                .with_context(|| format!("failed to write {}", target.display()))?,
            None => std::io::stdout().write_all(content.as_bytes())?,
        }
    }

    if failed > 0 {
        bail!("{failed} of {} documents failed to render", files.len());
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("urlcard=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    match args.command {
        Command::Slug { url } => {
            println!("{}", slugify(&url));
            Ok(())
        }

        Command::Init {} => {
            let unfurler = Unfurler::new(&load_config(&args.overrides)?)?;
            unfurler.init()?;

            let settings = unfurler.settings();
            println!("{}", settings.thumbnail_dir.display());
            println!("{}", settings.metadata_dir.display());
            Ok(())
        }

        Command::Render {
            files,
            in_place,
            out_dir,
            parallelism,
        } => {
            let mut config = load_config(&args.overrides)?;
            if let Some(parallelism) = parallelism {
                config.parallelism = parallelism;
            }

            let unfurler = Unfurler::new(&config)?;
            render(&unfurler, files, in_place, out_dir)
        }

        Command::Show { url } => {
            let unfurler = Unfurler::new(&load_config(&args.overrides)?)?;

            match unfurler.cache().get(&url)? {
                Some(doc) => {
                    println!("{}", serde_json::to_string_pretty(&doc)?);
                    Ok(())
                }
                None => bail!("{url} is not cached ({})", unfurler.cache().path_for(&url).display()),
            }
        }

        Command::List {} => {
            let unfurler = Unfurler::new(&load_config(&args.overrides)?)?;
            for slug in unfurler.cache().slugs() {
                println!("{slug}");
            }
            Ok(())
        }
    }
}
