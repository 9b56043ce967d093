use clap::{Parser, Subcommand};
use mat5::{summarize, Array, ArrayFilter, ByteOrder, MatFile, ReadOptions};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "MAT CLI - Inspect and convert MAT-files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the arrays of one or more files
    List {
        files: Vec<PathBuf>,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the values of one array
    Show {
        file: PathBuf,

        /// Array name
        name: String,

        /// Maximum number of elements to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Rewrite a file as level 5 (optionally compressed) or level 4
    Convert {
        input: PathBuf,
        output: PathBuf,

        /// Write a level 4 file
        #[arg(long)]
        v4: bool,

        /// Disable compression of level 5 output
        #[arg(long)]
        no_compress: bool,

        /// Write big-endian output
        #[arg(long)]
        big_endian: bool,

        /// Only convert these arrays
        #[arg(long = "only")]
        only: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let start_time = std::time::Instant::now();

    match &cli.command {
        Commands::List { files, json } => handle_list(files, *json)?,
        Commands::Show { file, name, limit } => handle_show(file, name, *limit)?,
        Commands::Convert {
            input,
            output,
            v4,
            no_compress,
            big_endian,
            only,
        } => {
            let order = if *big_endian {
                ByteOrder::Big
            } else {
                ByteOrder::Little
            };
            handle_convert(input, output, *v4, !*no_compress, order, only)?;
        }
    }

    eprintln!("Completed in {:.2?}", start_time.elapsed());
    Ok(())
}

fn handle_list(files: &[PathBuf], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let results = mat5::read_files_parallel(files, &ReadOptions::default());
    for (path, result) in files.iter().zip(results) {
        let arrays = match result {
            Ok(arrays) => arrays,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                continue;
            }
        };
        if json {
            #[cfg(feature = "serde")]
            println!("{}", mat5::summary::to_json(&arrays)?);
            #[cfg(not(feature = "serde"))]
            eprintln!("JSON output requires the 'serde' feature");
        } else {
            println!("{}:", path.display());
            for info in summarize(&arrays) {
                println!("  {info}");
            }
        }
    }
    Ok(())
}

fn handle_show(file: &Path, name: &str, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let Some(array) = MatFile::open(file).read_one(name)? else {
        return Err(format!("no array named '{name}' in {}", file.display()).into());
    };
    print_array(&array, limit, 0);
    Ok(())
}

fn print_array(array: &Array, limit: usize, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{indent}{}", mat5::ArrayInfo::from(array));
    match array {
        Array::Char(c) => {
            for r in 0..c.meta().rows() {
                if let Ok(row) = c.row_string(r) {
                    println!("{indent}  '{row}'");
                }
            }
        }
        Array::Sparse(s) => {
            for (idx, value) in s.indices().zip(s.real_values()).take(limit) {
                println!("{indent}  ({}, {}) = {value}", idx.row, idx.col);
            }
        }
        Array::Cell(c) => {
            for cell in c.iter().take(limit) {
                print_array(cell, limit, depth + 1);
            }
        }
        Array::Struct(s) => print_fields(s, limit, depth),
        Array::Object(o) => print_fields(o.fields(), limit, depth),
        Array::Opaque(o) => print_array(o.content(), limit, depth + 1),
        other => {
            let values: Vec<String> = (0..other.element_count().min(limit))
                .filter_map(|i| other.get_flat_f64(i).ok())
                .map(|v| v.to_string())
                .collect();
            println!("{indent}  [{}]", values.join(", "));
        }
    }
}

fn print_fields(s: &mat5::StructArray, limit: usize, depth: usize) {
    for i in 0..s.len().min(limit) {
        for field in s.field_names() {
            if let Some(value) = s.field_at(field, i) {
                println!("{}  ({i}).{field}:", "  ".repeat(depth));
                print_array(value, limit, depth + 2);
            }
        }
    }
}

fn handle_convert(
    input: &Path,
    output: &Path,
    v4: bool,
    compress: bool,
    order: ByteOrder,
    only: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let options = ReadOptions::default().with_filter(ArrayFilter::only(only.iter().cloned()));
    let arrays = MatFile::open(input).read_with(&options)?;
    if v4 {
        let bytes = mat5::legacy::write_all(&arrays, order)?;
        std::fs::write(output, bytes)?;
    } else {
        let options = mat5::WriteOptions::default()
            .with_compression(compress)
            .with_byte_order(order);
        MatFile::write(output, &arrays, &options)?;
    }
    println!("Converted {} arrays to {}", arrays.len(), output.display());
    Ok(())
}
