// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use tumblog::{
    config::Config,
    path::{default_config_path, default_store_dir},
    tumbler::{parse, render},
    AddressSpec, Blog, DateAddress, Entry, Granularity,
};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::{
    fs::read_to_string,
    io::{stdin, ErrorKind, IsTerminal, Read},
    path::{Path, PathBuf},
    process::exit,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "tumblog [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Path to storage root, overriding configuration.
    #[arg(long, global = true, value_name = "path")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let root = match (self.root, &config.store.root) {
            (Some(root), _) => root,
            (None, Some(root)) => root.as_path().to_path_buf(),
            (None, None) => default_store_dir()?,
        };
        let session = Session {
            config,
            root,
            now: Local::now().naive_local(),
        };

        match self.command {
            Command::Init => session.run_init(),
            Command::Parse(opts) => run_parse(opts),
            Command::Show(opts) => session.run_show(opts),
            Command::Latest(opts) => session.run_latest(opts),
            Command::New(opts) => session.run_new(opts),
            Command::Edit(opts) => session.run_edit(opts),
            Command::Nav(opts) => session.run_nav(opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Initialize new store.
    #[command(override_usage = "tumblog init [options]")]
    Init,

    /// Resolve tumbler without touching the store.
    #[command(override_usage = "tumblog parse [options] <tumbler>")]
    Parse(ParseOptions),

    /// Show entries named by tumbler.
    #[command(override_usage = "tumblog show [options] [<tumbler>]")]
    Show(ShowOptions),

    /// Show newest entries.
    #[command(override_usage = "tumblog latest [options]")]
    Latest(LatestOptions),

    /// Append new entry, reading its body from standard input.
    #[command(override_usage = "tumblog new [options]")]
    New(NewOptions),

    /// Update existing entry in place.
    #[command(override_usage = "tumblog edit [options] <address>")]
    Edit(EditOptions),

    /// Find previous and next populated addresses around tumbler.
    #[command(override_usage = "tumblog nav [options] <tumbler>")]
    Nav(NavOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ParseOptions {
    /// Tumbler to resolve, e.g., "2000/12/20.2-09/15".
    #[arg(required = true, value_name = "tumbler")]
    pub tumbler: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ShowOptions {
    /// Tumbler naming entries to show. Shows newest entries if empty.
    #[arg(value_name = "tumbler", default_value = "")]
    pub tumbler: String,

    /// List entries newest first.
    #[arg(short, long)]
    pub reverse: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct LatestOptions {
    /// Number of entries to show.
    #[arg(short = 'n', long, value_name = "count")]
    pub count: Option<usize>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct NewOptions {
    /// Title of entry.
    #[arg(short, long, value_name = "title")]
    pub title: Option<String>,

    /// Class of entry.
    #[arg(short, long, value_name = "class")]
    pub class: Option<String>,

    /// Author of entry.
    #[arg(short, long, value_name = "author")]
    pub author: Option<String>,

    /// Status of entry.
    #[arg(short, long, value_name = "status")]
    pub status: Option<String>,

    /// Advertising tag of entry.
    #[arg(long, value_name = "adtag")]
    pub adtag: Option<String>,

    /// Day to file entry under instead of today.
    #[arg(short, long, value_name = "YYYY/MM/DD", value_parser = parse_day)]
    pub date: Option<NaiveDate>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct EditOptions {
    /// Address of entry to update, e.g., "2000/12/20.2".
    #[arg(required = true, value_name = "address")]
    pub address: DateAddress,

    /// New title of entry.
    #[arg(short, long, value_name = "title")]
    pub title: Option<String>,

    /// New class of entry.
    #[arg(short, long, value_name = "class")]
    pub class: Option<String>,

    /// New author of entry.
    #[arg(short, long, value_name = "author")]
    pub author: Option<String>,

    /// New status of entry.
    #[arg(short, long, value_name = "status")]
    pub status: Option<String>,

    /// New advertising tag of entry.
    #[arg(long, value_name = "adtag")]
    pub adtag: Option<String>,

    /// Replace body with standard input.
    #[arg(short, long)]
    pub body: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct NavOptions {
    /// Tumbler to navigate from. Its granularity sets the step size.
    #[arg(required = true, value_name = "tumbler")]
    pub tumbler: String,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time()
        .with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

/// State shared by every command touching the store.
struct Session {
    config: Config,
    root: PathBuf,
    now: NaiveDateTime,
}

impl Session {
    fn open(&self) -> Result<Blog> {
        let blog = Blog::open(&self.root, self.now)?.with_max_parts(self.config.store.max_parts);
        Ok(blog)
    }

    fn run_init(&self) -> Result<()> {
        let blog = Blog::init(&self.root, self.now)?;
        info!("store ready at {:?}", blog.root().display());

        Ok(())
    }

    fn run_show(&self, opts: ShowOptions) -> Result<()> {
        let spec = parse(&opts.tumbler);
        if spec.is_error {
            bail!("no entries found at {:?}", opts.tumbler);
        }
        if spec.needs_redirect {
            info!("canonical address of {:?} is /{spec}", opts.tumbler);
        }

        let blog = self.open()?;
        if spec.is_file {
            return show_file(&blog, &spec);
        }

        let entries = if spec.is_index() {
            blog.latest(self.config.display.count)?
        } else if !spec.is_range && spec.start_unit == Granularity::Part {
            blog.read(spec.start)?.into_iter().collect()
        } else {
            blog.read_range(spec.start, spec.stop, !opts.reverse)?
        };

        if entries.is_empty() {
            bail!("no entries found at /{spec}");
        }
        for entry in &entries {
            print_entry(entry);
        }

        Ok(())
    }

    fn run_latest(&self, opts: LatestOptions) -> Result<()> {
        let blog = self.open()?;
        let count = opts.count.unwrap_or(self.config.display.count);
        for entry in blog.latest(count)? {
            print_entry(&entry);
        }

        Ok(())
    }

    fn run_new(&self, opts: NewOptions) -> Result<()> {
        let blog = self.open()?;
        let defaults = &self.config.entry;

        let mut entry = blog.create();
        if let Some(date) = opts.date {
            entry.when = DateAddress::from_date(date, 0);
        }
        entry.title = opts.title.unwrap_or_default();
        entry.class = opts.class.unwrap_or_else(|| defaults.class.clone());
        entry.author = opts.author.unwrap_or_else(|| defaults.author.clone());
        entry.status = opts.status.unwrap_or_else(|| defaults.status.clone());
        entry.adtag = opts.adtag.unwrap_or_default();
        entry.body = read_body()?;

        blog.write(&mut entry)?;
        println!("{}", entry.when);

        Ok(())
    }

    fn run_edit(&self, opts: EditOptions) -> Result<()> {
        let blog = self.open()?;
        let mut entry = blog
            .read(opts.address)?
            .ok_or_else(|| anyhow!("entry {} does not exist", opts.address))?;

        if let Some(title) = opts.title {
            entry.title = title;
        }
        if let Some(class) = opts.class {
            entry.class = class;
        }
        if let Some(author) = opts.author {
            entry.author = author;
        }
        if let Some(status) = opts.status {
            entry.status = status;
        }
        if let Some(adtag) = opts.adtag {
            entry.adtag = adtag;
        }
        if opts.body {
            entry.body = read_body()?;
        }

        blog.write(&mut entry)?;
        println!("{}", entry.when);

        Ok(())
    }

    fn run_nav(&self, opts: NavOptions) -> Result<()> {
        let spec = parse(&opts.tumbler);
        if spec.is_error || spec.is_index() || spec.is_file {
            bail!("cannot navigate from {:?}", opts.tumbler);
        }

        let blog = self.open()?;
        let navigator = blog.navigator();
        let previous = navigator.previous(spec.start, spec.start_unit)?;
        let next = navigator.next(spec.stop, spec.stop_unit)?;

        println!("previous: {}", describe(previous, spec.start_unit));
        println!("next: {}", describe(next, spec.stop_unit));

        Ok(())
    }
}

fn run_parse(opts: ParseOptions) -> Result<()> {
    let spec: AddressSpec = opts
        .tumbler
        .parse()
        .with_context(|| format!("cannot resolve tumbler {:?}", opts.tumbler))?;

    println!("canonical: /{spec}");
    println!("start: {} ({:?})", spec.start, spec.start_unit);
    println!("stop: {} ({:?})", spec.stop, spec.stop_unit);
    println!("range: {}", spec.is_range);
    if let Some(filename) = &spec.filename {
        println!("file: {filename}");
    }
    println!("redirect: {}", spec.needs_redirect);

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    // INVARIANT: Only an explicitly named configuration file must exist.
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (default_config_path()?, false),
    };

    match read_to_string(&path) {
        Ok(data) => data
            .parse::<Config>()
            .with_context(|| format!("failed to parse configuration at {:?}", path.display())),
        Err(err) if !required && err.kind() == ErrorKind::NotFound => Ok(Config::default()),
        Err(err) => Err(err)
            .with_context(|| format!("failed to read configuration at {:?}", path.display())),
    }
}

fn show_file(blog: &Blog, spec: &AddressSpec) -> Result<()> {
    let (Some(date), Some(filename)) = (spec.start.date(), &spec.filename) else {
        bail!("no file found at /{spec}");
    };

    let path = blog.day_dir(date).join(filename);
    if !path.is_file() {
        bail!("no file found at /{spec}");
    }
    println!("{}", path.display());

    Ok(())
}

fn read_body() -> Result<Vec<u8>> {
    let mut body = Vec::new();
    let mut input = stdin();
    if !input.is_terminal() {
        input
            .read_to_end(&mut body)
            .context("failed to read body from standard input")?;
    }

    Ok(body)
}

fn print_entry(entry: &Entry) {
    println!("== {} {}", entry.when, entry.title);
    for (label, value) in [
        ("class", &entry.class),
        ("author", &entry.author),
        ("status", &entry.status),
        ("adtag", &entry.adtag),
    ] {
        if !value.is_empty() {
            println!("{label}: {value}");
        }
    }
    println!("written: {}", entry.timestamp.format("%Y-%m-%d %H:%M:%S"));
    println!();
    println!("{}", entry.body_text().trim_end());
    println!();
}

fn describe(address: Option<DateAddress>, unit: Granularity) -> String {
    match address {
        Some(address) => format!("/{}", render(&address, unit)),
        None => "none".into(),
    }
}

fn parse_day(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y/%m/%d").map_err(|err| format!("{value:?}: {err}"))
}
