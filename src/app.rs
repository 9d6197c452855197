use anyhow::{Context, Result, bail};
use comfy_table::{Table, presets::UTF8_FULL};
use video_preflight::{
    compress::{CompressionRequest, compress},
    pipeline::{self, PipelineOptions},
    remux::{ContainerFormat, remux},
    resources::Resources,
    settings::Settings,
    tags::copy_tags,
    tools::{SystemRunner, Tool, Toolchain, check_tools, ensure_tools},
};

use crate::cli::{Cli, Commands, copy_tags_flag};

pub fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref()).with_context(|| {
        format!(
            "Could not read settings from {}",
            cli.config
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )
    })?;
    let runner = SystemRunner::new(settings.tools.clone(), cli.quiet);

    match cli.command {
        Commands::CheckTools => handle_check_tools(&runner),
        Commands::ReplaceAudio {
            source,
            new_audio,
            destination,
        } => {
            pipeline::replace_audio(&source, &new_audio, &destination)?;
            Ok(())
        }
        Commands::CopyTags {
            source,
            destination,
        } => {
            ensure_tools(&runner, &[Tool::ExifTool])?;
            let resources = Resources::bundled()?;
            copy_tags(toolchain(&runner, &resources), &source, &destination)?;
            Ok(())
        }
        Commands::Compress {
            source,
            destination,
            compression,
        } => {
            ensure_tools(&runner, &[Tool::HandBrake])?;
            let resources = Resources::bundled()?;
            let request = CompressionRequest {
                source,
                destination,
                settings: settings.compression(&compression.overrides()),
                replacement_audio: None,
            };
            compress(toolchain(&runner, &resources), &request)?;
            Ok(())
        }
        Commands::WriteMovContainer {
            source,
            destination,
        } => {
            ensure_tools(&runner, &[Tool::Ffmpeg])?;
            let resources = Resources::bundled()?;
            let destination =
                destination.unwrap_or_else(|| source.with_extension(ContainerFormat::Mov.extension()));
            remux(
                toolchain(&runner, &resources),
                &source,
                &destination,
                ContainerFormat::Mov,
            )?;
            Ok(())
        }
        Commands::Run {
            source,
            replace_audio,
            compression,
            copy_tags,
            no_copy_tags,
        } => {
            let options = PipelineOptions {
                compression: settings.compression(&compression.overrides()),
                replace_audio,
                copy_tags: settings.copy_tags(copy_tags_flag(copy_tags, no_copy_tags)),
            };
            ensure_tools(&runner, &options.required_tools())?;
            let resources = Resources::bundled()?;
            pipeline::run(toolchain(&runner, &resources), &source, &options)?;
            Ok(())
        }
    }
}

fn toolchain<'a>(runner: &'a SystemRunner, resources: &'a Resources) -> Toolchain<'a> {
    Toolchain { runner, resources }
}

fn handle_check_tools(runner: &SystemRunner) -> Result<()> {
    println!("🔍 Checking external tools...\n");

    let statuses = check_tools(runner);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Tool", "Status", "Version", "Path / Error"]);

    for status in &statuses {
        table.add_row(vec![
            status.tool.to_string(),
            if status.path.is_some() { "✅ found" } else { "❌ missing" }.to_string(),
            status.version.clone().unwrap_or_else(|| "unknown".to_string()),
            status
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .or_else(|| status.error.clone())
                .unwrap_or_default(),
        ]);
    }

    println!("{table}");

    let missing: Vec<String> = statuses
        .iter()
        .filter(|s| s.path.is_none())
        .map(|s| s.tool.to_string())
        .collect();
    if !missing.is_empty() {
        bail!("Missing required tools: {}", missing.join(", "));
    }

    println!("\n🎉 All tools found!");
    Ok(())
}
