use anyhow::{Context, bail};
use movelist::model::MergeMode;
use movelist::settings::DecoderSettings;
use movelist::{MoveList, load_file, write_native};
use std::fs::File;
use std::io::BufWriter;

#[derive(Debug, Default)]
struct Args {
    input: String,
    patches: Vec<String>,
    json: bool,
    encode: Option<String>,
    no_default_names: bool,
    save_settings: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args::default();
    let mut input = None;
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--patch" => args
                .patches
                .push(iter.next().context("--patch needs a file")?),
            "--encode" => args.encode = Some(iter.next().context("--encode needs a file")?),
            "--json" => args.json = true,
            "--no-default-names" => args.no_default_names = true,
            "--save-settings" => args.save_settings = true,
            _ if arg.starts_with("--") => bail!("unknown option {}", arg),
            _ if input.is_none() => input = Some(arg),
            _ => bail!("unexpected argument {}", arg),
        }
    }
    args.input = input.context(
        "usage: movelist <file> [--patch <file>...] [--json] [--encode <out>] \
         [--no-default-names] [--save-settings]",
    )?;
    Ok(args)
}

fn print_summary(table: &MoveList) {
    for (index, seq) in table.initialized() {
        let hitboxes: usize = seq.frames.iter().map(|f| f.hitboxes.len()).sum();
        println!(
            "{:4}  {:<24} {:3} frames {:4} boxes",
            index,
            seq.name,
            seq.frames.len(),
            hitboxes
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = parse_args()?;
    let mut settings = DecoderSettings::load();
    if args.no_default_names {
        settings.apply_default_names = false;
    }
    if args.save_settings {
        settings.save();
    }
    let mut opts = settings.to_options();

    let mut table = MoveList::default();
    let report = load_file(&args.input, &mut table, &opts)
        .with_context(|| format!("failed to load {}", args.input))?;
    log::info!("{}: {:?}", args.input, report.format);

    opts.merge = MergeMode::Patch;
    for patch in &args.patches {
        load_file(patch, &mut table, &opts)
            .with_context(|| format!("failed to apply patch {}", patch))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        print_summary(&table);
    }

    if let Some(out) = &args.encode {
        let file = File::create(out).with_context(|| format!("cannot create {}", out))?;
        write_native(&table, BufWriter::new(file))
            .with_context(|| format!("failed to write {}", out))?;
        log::info!("wrote native move list to {}", out);
    }
    Ok(())
}
