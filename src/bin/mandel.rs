extern crate clap;
extern crate env_logger;
extern crate image;
#[macro_use]
extern crate log;
extern crate mandelgrid;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use image::png::PNGEncoder;
use image::ColorType;
use num::Complex;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use mandelgrid::{EscapeGrid, GridComputer, GridPlane, Variant};

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_float(s: &str, err: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const ITERATIONS: &str = "iterations";
const THREADS: &str = "threads";
const VARIANT: &str = "variant";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const HUE_STEP: &str = "hue-step";
const HUE_OFFSET: &str = "hue-offset";
const FRAMES: &str = "frames";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandel")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mandelbrot escape-time renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file, or output directory in frames mode"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range::<usize>(
                        &s,
                        1,
                        20_000,
                        "Could not parse grid resolution",
                        "Grid resolution must be between 1 and 20000",
                    )
                })
                .help("Samples per axis of the square grid"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
                .validator(|s| {
                    validate_range::<u32>(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Iteration budget per point"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("0")
                .validator(move |s| {
                    validate_range(
                        &s,
                        0,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 0 and {}", max_threads),
                    )
                })
                .help("Number of worker threads, 0 for every CPU"),
        )
        .arg(
            Arg::with_name(VARIANT)
                .required(false)
                .long(VARIANT)
                .short("v")
                .takes_value(true)
                .default_value("complex")
                .possible_values(&["complex", "naive", "optimized"])
                .help("Arithmetic strategy for the escape computation"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2,-2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the sampled window"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("2,2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the sampled window"),
        )
        .arg(
            Arg::with_name(HUE_STEP)
                .required(false)
                .long(HUE_STEP)
                .takes_value(true)
                .default_value("36")
                .validator(|s| validate_float(&s, "Could not parse hue step"))
                .help("Degrees of hue per escape count"),
        )
        .arg(
            Arg::with_name(HUE_OFFSET)
                .required(false)
                .long(HUE_OFFSET)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_float(&s, "Could not parse hue offset"))
                .help("Hue rotation applied to the whole palette"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .required(false)
                .long(FRAMES)
                .takes_value(true)
                .validator(|s| {
                    validate_range::<u32>(
                        &s,
                        1,
                        3600,
                        "Could not parse frame count",
                        "Frame count must be between 1 and 3600",
                    )
                })
                .help("Render a hue-rotated frame sequence of this length"),
        )
        .get_matches()
}

/// Standard HSV to RGB conversion over full-range saturation and
/// value.
fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> (u8, u8, u8) {
    let chroma = value * saturation;
    let hue6 = hue / 60.0;
    let x = chroma * (1.0 - (hue6 % 2.0 - 1.0).abs());
    let (r, g, b) = match hue6 as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = value - chroma;
    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}

/// Maps escape counts to RGB bytes.  Cells that exhausted the budget,
/// or that escaped before a single accepted step, are painted black;
/// every other count walks the hue circle.
fn render(grid: &EscapeGrid, max_iterations: u32, hue_step: f64, hue_offset: f64) -> Vec<u8> {
    let resolution = grid.resolution();
    let mut pixels = vec![0 as u8; resolution * resolution * 3];
    for i in 0..resolution {
        for j in 0..resolution {
            let count = grid[(i, j)];
            if count == 0 || count == max_iterations {
                continue;
            }
            // Double mod keeps a negative offset on the hue circle.
            let hue = ((hue_step * ((count - 1) as f64) + hue_offset) % 360.0 + 360.0) % 360.0;
            let (r, g, b) = hsv_to_rgb(hue, 1.0, 1.0);
            let offset = (j * resolution + i) * 3;
            pixels[offset] = r;
            pixels[offset + 1] = g;
            pixels[offset + 2] = b;
        }
    }
    pixels
}

fn write_image(outfile: &Path, pixels: &[u8], resolution: usize) -> Result<(), std::io::Error> {
    let output = File::create(outfile)?;
    let encoder = PNGEncoder::new(output);
    encoder.encode(
        pixels,
        resolution as u32,
        resolution as u32,
        ColorType::RGB(8),
    )?;
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();

    let resolution = usize::from_str(matches.value_of(SIZE).unwrap())
        .expect("Could not parse grid resolution");
    let iterations =
        u32::from_str(matches.value_of(ITERATIONS).unwrap()).expect("Could not parse iteration count");
    let threads =
        usize::from_str(matches.value_of(THREADS).unwrap()).expect("Could not parse thread count");
    let variant =
        Variant::from_str(matches.value_of(VARIANT).unwrap()).expect("Could not parse variant");
    let leftlower = parse_complex(matches.value_of(LEFTLOWER).unwrap())
        .expect("Error parsing left lower point");
    let rightupper = parse_complex(matches.value_of(RIGHTUPPER).unwrap())
        .expect("Error parsing right upper point");
    let hue_step =
        f64::from_str(matches.value_of(HUE_STEP).unwrap()).expect("Could not parse hue step");
    let hue_offset =
        f64::from_str(matches.value_of(HUE_OFFSET).unwrap()).expect("Could not parse hue offset");

    let threads = if threads == 0 {
        num_cpus::get()
    } else {
        threads
    };

    let plane = match GridPlane::with_corners(resolution, leftlower, rightupper) {
        Ok(plane) => plane,
        Err(e) => {
            eprintln!("Bad window: {}", e);
            std::process::exit(1);
        }
    };
    let computer = match GridComputer::new(plane, iterations, variant) {
        Ok(computer) => computer,
        Err(e) => {
            eprintln!("Bad parameters: {}", e);
            std::process::exit(1);
        }
    };

    // One escape computation serves every frame; only the coloring
    // depends on the animation parameter.
    let grid = match computer.compute_threaded(threads) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Computation failure: {}", e);
            std::process::exit(1);
        }
    };

    match matches.value_of(FRAMES) {
        None => {
            let pixels = render(&grid, iterations, hue_step, hue_offset);
            let outfile = Path::new(matches.value_of(OUTPUT).unwrap());
            if let Err(e) = write_image(outfile, &pixels, resolution) {
                eprintln!("Write failure: {}", e);
                std::process::exit(1);
            }
        }
        Some(count) => {
            let frames = u32::from_str(count).expect("Could not parse frame count");
            let dir = PathBuf::from(matches.value_of(OUTPUT).unwrap());
            if let Err(e) = std::fs::create_dir_all(&dir) {
                eprintln!("Could not create {}: {}", dir.display(), e);
                std::process::exit(1);
            }
            for frame in 0..frames {
                let offset = hue_offset + 360.0 * (frame as f64) / (frames as f64);
                let pixels = render(&grid, iterations, hue_step, offset);
                let outfile = dir.join(format!("frame_{:03}.png", frame));
                if let Err(e) = write_image(&outfile, &pixels, resolution) {
                    eprintln!("Write failure on {}: {}", outfile.display(), e);
                    std::process::exit(1);
                }
                if frame % 10 == 0 {
                    info!("rendered frame {} of {}", frame, frames);
                }
            }
        }
    }
}
