use argh::FromArgs;
use image::{ImageFormat, RgbImage, RgbaImage};
use log::{debug, info};
use qoi::{
    utils::pixels_to_bytes, BitDepth, Colorspace, DecodeOptions, Descriptor, Pixel,
    QoiDecodeContext, QoiEncodeContext,
};
use std::{fs::File, io::BufReader, io::BufWriter, str::FromStr};

/// QOI cli encoder and decoder.
#[derive(FromArgs)]
struct Cli {
    /// log level (error, warn, info, debug, trace), defaults to info
    #[argh(option, default = "log::Level::Info")]
    log_level: log::Level,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Encode(Encode),
    Decode(Decode),
}

/// Decodes a QOI image.
#[derive(FromArgs)]
#[argh(subcommand, name = "decode")]
struct Decode {
    /// output format (png, jpg, bmp)
    #[argh(option)]
    format: Format,

    /// reject truncated chunk streams and a missing end marker
    #[argh(switch)]
    strict: bool,

    /// the QOI input file
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Png,
    Jpg,
    Bmp,
}

impl FromStr for Format {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[rustfmt::skip]
        let Some(format) = s.eq_ignore_ascii_case("png").then_some(Format::Png)
               .or_else(|| s.eq_ignore_ascii_case("jpg").then_some(Format::Jpg))
               .or_else(|| s.eq_ignore_ascii_case("bmp").then_some(Format::Bmp))
        else { return Err("invalid string"); };

        Ok(format)
    }
}

impl From<Format> for ImageFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => ImageFormat::Png,
            Format::Jpg => ImageFormat::Jpeg,
            Format::Bmp => ImageFormat::Bmp,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli { log_level, command } = argh::from_env();

    simple_logger::init_with_level(log_level)?;

    match command {
        Command::Encode(options) => encode(options),
        Command::Decode(options) => decode(options),
    }
}

/// Encodes an image as QOI.
#[derive(FromArgs)]
#[argh(subcommand, name = "encode")]
struct Encode {
    /// input format, optional (png, jpg, bmp)
    #[argh(option)]
    format: Option<Format>,

    /// bit depth to save with (auto, 32, 24), defaults to auto
    #[argh(option, default = "BitDepth::AutoDetect")]
    bit_depth: BitDepth,

    /// tag the image as linear instead of sRGB
    #[argh(switch)]
    linear: bool,

    /// the input file. May be a PNG, JPG, or BMP.
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn encode(options: Encode) -> Result<(), Box<dyn std::error::Error>> {
    let Encode {
        format,
        bit_depth,
        linear,
        input,
        output,
    } = options;

    let image = match format {
        Some(format) => {
            image::io::Reader::with_format(BufReader::new(File::open(&input)?), format.into())
                .decode()?
        }
        None => image::io::Reader::open(&input)?
            .with_guessed_format()?
            .decode()?,
    };

    let width = image.width();
    let height = image.height();

    info!("Encoding {width}x{height} image");

    let mut pixels = image
        .into_rgba8()
        .pixels()
        .map(|p| Pixel::from(p.0))
        .collect::<Vec<_>>();

    let channels = bit_depth.prepare(&mut pixels);
    debug!("Resolved {bit_depth:?} to {channels} channels");

    let colorspace = if linear {
        Colorspace::Linear
    } else {
        Colorspace::Srgb
    };
    let desc = Descriptor::new(width, height, channels, colorspace);

    let v = QoiEncodeContext::encode_to_vec(&desc, &pixels)?;

    std::fs::write(&output, &v)?;
    info!("Written {} bytes to `{output}`", v.len());

    Ok(())
}

fn decode(options: Decode) -> Result<(), Box<dyn std::error::Error>> {
    let Decode {
        format,
        strict,
        input,
        output,
    } = options;

    let qoi_input = std::fs::read(&input)?;

    info!("Decoding `{input}`");

    let options = DecodeOptions::new().set_strict(strict);
    let (desc, pixels) = QoiDecodeContext::decode_to_vec_with_options(&qoi_input, &options)?;
    let Descriptor {
        width,
        height,
        channels,
        colorspace,
    } = desc;
    debug!("{channels} channels, colorspace {colorspace:?}");

    let raw = pixels_to_bytes(&pixels, channels);
    let mut writer = BufWriter::new(File::create(&output)?);

    // jpg has no alpha channel
    if channels == 4 && !matches!(format, Format::Jpg) {
        RgbaImage::from_vec(width, height, raw)
            .ok_or("failed to create image")?
            .write_to(&mut writer, ImageFormat::from(format))?;
    } else {
        let raw = if channels == 4 {
            pixels_to_bytes(&pixels, 3)
        } else {
            raw
        };
        RgbImage::from_vec(width, height, raw)
            .ok_or("failed to create image")?
            .write_to(&mut writer, ImageFormat::from(format))?;
    }

    info!("Written {width}x{height} image to `{output}`");

    Ok(())
}
