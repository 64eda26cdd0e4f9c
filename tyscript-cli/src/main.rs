use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::debug;
use tyscript_core::{
    CompilerOptions, CustomTransforms, LogTransform, MemoryHost, ModuleKind, Program,
    RenameTransform, ScriptTarget,
};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long, help = "Input source file (reads stdin when absent)")]
    input: Option<String>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Register every .tys file under DIR"
    )]
    input_dir: Option<String>,

    #[arg(
        short,
        long,
        value_name = "DIR",
        help = "Write outputs under DIR instead of printing them"
    )]
    out_dir: Option<String>,

    #[arg(
        long,
        value_name = "TARGET",
        default_value = "esnext",
        help = "Script target: es5, esnext"
    )]
    target: String,

    #[arg(
        long,
        value_name = "KIND",
        default_value = "esm",
        help = "Module kind: esm, commonjs"
    )]
    module: String,

    #[arg(long, help = "Emit declaration files")]
    declaration: bool,

    #[arg(long, help = "Emit declaration files only")]
    declaration_only: bool,

    #[arg(long, help = "Emit a source map next to each generated script")]
    source_map: bool,

    #[arg(long, help = "Permit @name decorators on function declarations")]
    experimental_decorators: bool,

    #[arg(long, help = "Pass parameter type names to desugared decorator calls")]
    emit_decorator_metadata: bool,

    #[arg(long, help = "Check the input without producing output")]
    no_emit: bool,

    #[arg(
        long,
        value_name = "PATH",
        help = "Bundle all units into a single output file"
    )]
    out_file: Option<String>,

    #[arg(
        long,
        value_name = "NAME",
        help = "Rewrite every identifier to NAME during emit"
    )]
    rename: Option<String>,

    #[arg(long, help = "Log each unit as the emit transforms visit it")]
    log_emit: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    execute(cli)
}

fn execute(cli: Cli) -> Result<()> {
    let mut host = MemoryHost::new();

    match &cli.input {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read input file {path}"))?;
            host.put(virtual_path(path), text);
        }
        None if cli.input_dir.is_none() => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            host.put("/stdin.tys", buffer);
        }
        None => {}
    }

    if let Some(dir) = &cli.input_dir {
        register_directory(&mut host, dir)?;
    }

    let roots = host.source_paths();
    if roots.is_empty() {
        bail!("no input sources were registered");
    }
    debug!("registered {} source file(s)", roots.len());

    host.parse_units()?;

    let options = build_options(&cli)?;
    let root_refs: Vec<&str> = roots.iter().map(String::as_str).collect();
    let program = Program::new(&root_refs, options, &host)?;

    let mut transforms = CustomTransforms::new();
    if cli.log_emit {
        transforms = transforms
            .with_before(LogTransform)
            .with_after_declarations(LogTransform);
    }
    if let Some(name) = &cli.rename {
        transforms = transforms
            .with_before(RenameTransform::new(name.clone()))
            .with_after_declarations(RenameTransform::new(name.clone()));
    }

    let result = program.emit(&mut host, None, None, cli.declaration_only, &transforms);
    if result.emit_skipped {
        bail!("emit was skipped; no output was produced");
    }

    match &cli.out_dir {
        Some(dir) => {
            for path in &result.emitted_files {
                let contents = host.output(path).unwrap_or_default();
                write_output(dir, path, contents)?;
            }
        }
        None => {
            println!("emit succeeded:");
            for path in &result.emitted_files {
                println!("--- {path} ---");
                print!("{}", host.output(path).unwrap_or_default());
            }
        }
    }

    Ok(())
}

fn build_options(cli: &Cli) -> Result<CompilerOptions> {
    let target = match cli.target.as_str() {
        "es5" => ScriptTarget::Es5,
        "esnext" => ScriptTarget::EsNext,
        other => bail!("unsupported target '{other}'"),
    };
    let module = match cli.module.as_str() {
        "esm" => ModuleKind::EsModule,
        "commonjs" => ModuleKind::CommonJs,
        other => bail!("unsupported module kind '{other}'"),
    };
    Ok(CompilerOptions {
        target,
        module,
        declaration: cli.declaration || cli.declaration_only,
        source_map: cli.source_map,
        experimental_decorators: cli.experimental_decorators,
        emit_decorator_metadata: cli.emit_decorator_metadata,
        no_emit: cli.no_emit,
        out_file: cli.out_file.clone(),
    })
}

/// Store path for a single input file: its file name at the virtual root.
fn virtual_path(path: &str) -> String {
    let name = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    format!("/{name}")
}

fn register_directory(host: &mut MemoryHost, dir: &str) -> Result<()> {
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "tys") {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read source file {}", path.display()))?;
            let relative = path.strip_prefix(dir).unwrap_or(path);
            let store_path = format!("/{}", relative.to_string_lossy().replace('\\', "/"));
            host.put(store_path, text);
        }
    }
    Ok(())
}

fn write_output(dir: &str, path: &str, contents: &str) -> Result<()> {
    let target = Path::new(dir).join(path.trim_start_matches('/'));
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent:?}"))?;
        }
    }
    fs::write(&target, contents)
        .with_context(|| format!("failed to write output file {target:?}"))?;
    Ok(())
}
