use clap::Parser;
use std::path::PathBuf;
use supernum::build::{BuildOutcome, Builder};
use supernum::config::BuildConfig;
use supernum::output;
use supernum::sync::PromptConfirm;

#[derive(Parser)]
#[command(name = "supernum")]
#[command(about = "Pragmatic static site generator")]
#[command(long_about = "\
Pragmatic static site generator

Mirrors a tree of Markdown and reStructuredText documents into a tree of HTML
pages, each rendered through templates/base.html. Every other file is copied
through unchanged.

Site layout (all paths relative to WORKDIR):

  site/
  ├── context.yaml                 # Global template values (or a .toml file)
  ├── templates/
  │   ├── base.html                # Defines {% block content %}
  │   └── partials/nav.html        # Anything base.html includes
  ├── root/                        # Source tree
  │   ├── index.md                 # → build/index.html
  │   ├── blog/2024/post.rst       # → build/blog/2024/post.html
  │   └── css/site.css             # → build/css/site.css (copied)
  └── build/                       # Output, wiped on every build

A document may start with a YAML metadata block, ended by a blank line:

  title: About
  author: Grace

  About
  =====

Metadata keys override context.yaml for that page only.

The output directory is deleted and rebuilt on every run. Without --force you
are asked first; answering no leaves it untouched.")]
#[command(version)]
struct Cli {
    /// Site directory; relative paths below resolve against it
    #[arg(default_value = ".")]
    workdir: PathBuf,

    /// Context file with global template values
    #[arg(short, long, default_value = "context.yaml")]
    context: PathBuf,

    /// Template directory containing base.html
    #[arg(short, long, default_value = "templates")]
    templates: PathBuf,

    /// Directory index file name
    #[arg(short, long, default_value = "index.html")]
    index: String,

    /// Source root
    #[arg(short, long, default_value = "root")]
    root: PathBuf,

    /// Output root (deleted and recreated)
    #[arg(short, long, default_value = "build")]
    build: PathBuf,

    /// Delete an existing output root without asking
    #[arg(short, long)]
    force: bool,

    /// Print what would be built and exit
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn build_config(&self) -> BuildConfig {
        BuildConfig {
            context: self.context.clone(),
            templates: self.templates.clone(),
            index: self.index.clone(),
            root: self.root.clone(),
            build: self.build.clone(),
            force: self.force,
        }
        .in_dir(&self.workdir)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut builder = Builder::new(cli.build_config())?;

    if cli.dry_run {
        output::print_plan(&builder.plan()?);
        return Ok(());
    }

    let mut confirm = PromptConfirm::terminal();
    match builder.build_with(&mut confirm, output::print_event)? {
        BuildOutcome::Completed(report) => output::print_report(&report),
        BuildOutcome::Declined { path } => output::print_declined(&path),
    }

    Ok(())
}
