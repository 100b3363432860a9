use crate::{cli::OutputFormat, error::Result};
#[cfg(feature = "colored-output")]
use colored::*;
use sportdeutschland_parser::media::{MediaDescriptor, StreamInfo};
use std::io::Write;
#[cfg(feature = "table-output")]
use tabled::{Table, Tabled, settings::Style};

pub struct OutputManager {
    colored: bool,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format_media(&self, media: &MediaDescriptor, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.format_pretty(media)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(media)? + "\n"),
            OutputFormat::JsonCompact => Ok(serde_json::to_string(media)? + "\n"),
            #[cfg(feature = "table-output")]
            OutputFormat::Table => Ok(self.format_table(media)),
            #[cfg(not(feature = "table-output"))]
            OutputFormat::Table => {
                // Fallback to pretty format when table feature is disabled
                Ok(self.format_pretty(media))
            }
        }
    }

    fn field(&self, output: &mut String, name: &str, value: &str, color: Color) {
        output.push_str(&format!(
            "  {}: {}\n",
            self.colorize(name, &Color::Yellow, false),
            self.colorize(value, &color, false)
        ));
    }

    fn format_pretty(&self, media: &MediaDescriptor) -> String {
        let mut output = String::new();

        output.push_str(&self.colorize("Media Information:", &Color::Green, true));
        output.push('\n');

        self.field(&mut output, "ID", &media.id, Color::Cyan);
        self.field(&mut output, "Display ID", &media.display_id, Color::Cyan);
        self.field(&mut output, "Title", &media.title, Color::Cyan);
        if let Some(description) = &media.description {
            self.field(&mut output, "Description", description, Color::Cyan);
        }
        if let Some(thumbnail) = &media.thumbnail {
            self.field(&mut output, "Thumbnail", thumbnail, Color::Blue);
        }
        if let Some(timestamp) = media.timestamp {
            self.field(&mut output, "Timestamp", &timestamp.to_string(), Color::Cyan);
        }
        if let Some(duration) = media.duration {
            self.field(&mut output, "Duration", &format_duration(duration), Color::Cyan);
        }

        output.push('\n');
        output.push_str(&self.colorize(
            &format!("Formats ({}, worst to best):", media.formats.len()),
            &Color::Green,
            true,
        ));
        output.push('\n');

        for stream in &media.formats {
            self.push_stream(&mut output, stream);
        }

        output
    }

    fn push_stream(&self, output: &mut String, stream: &StreamInfo) {
        output.push_str(&format!(
            "  {}\n",
            self.colorize(&stream.to_string(), &Color::Cyan, false)
        ));
        output.push_str(&format!(
            "    {}\n",
            self.colorize(&stream.url, &Color::Blue, false)
        ));
        if !stream.codec.is_empty() {
            output.push_str(&format!(
                "    {}: {}\n",
                self.colorize("Codec", &Color::Yellow, false),
                stream.codec
            ));
        }
        if let Some(extras) = stream.extras.as_ref().and_then(|e| e.as_object()) {
            for (key, value) in extras {
                output.push_str(&format!(
                    "    {}: {}\n",
                    self.colorize(key, &Color::Green, false),
                    value
                ));
            }
        }
    }

    #[cfg(feature = "table-output")]
    fn format_table(&self, media: &MediaDescriptor) -> String {
        #[derive(Tabled)]
        struct TableRow<'a> {
            id: &'a str,
            format: String,
            quality: &'a str,
            bitrate: String,
            codec: &'a str,
            url: &'a str,
        }

        let rows = media.formats.iter().map(|stream| TableRow {
            id: &stream.format_id,
            format: stream.stream_format.to_string(),
            quality: &stream.quality,
            bitrate: format!("{} kbps", stream.bitrate),
            codec: &stream.codec,
            url: &stream.url,
        });

        format!("{}\n{}\n", media.title, Table::new(rows).with(Style::modern()))
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Blue => text.blue(),
                    Color::Cyan => text.cyan(),
                };

                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            let _ = (self.colored, color, bold);
            text.to_string()
        }
    }
}

enum Color {
    Green,
    Yellow,
    Blue,
    Cyan,
}

fn format_duration(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.unsigned_abs();
    format!(
        "{sign}{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

pub fn write_output(content: &str, output_file: Option<&std::path::Path>) -> Result<()> {
    match output_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        None => {
            print!("{content}");
            std::io::stdout().flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sportdeutschland_parser::media::StreamFormat;

    fn media() -> MediaDescriptor {
        let mut stream = StreamInfo::direct("https://stream.mux.com/pb.m3u8?token=t", StreamFormat::Hls);
        stream.format_id = "hls-2500".to_string();
        stream.bitrate = 2500;
        MediaDescriptor {
            id: "asset-1".to_string(),
            display_id: "badminton/finals".to_string(),
            title: "Finals".to_string(),
            description: None,
            formats: vec![stream],
            thumbnail: None,
            timestamp: Some(1609459200),
            duration: Some(3725),
        }
    }

    #[test]
    fn pretty_lists_fields_and_formats() {
        let output = OutputManager::new(false)
            .format_media(&media(), &OutputFormat::Pretty)
            .unwrap();
        assert!(output.contains("  Title: Finals\n"));
        assert!(output.contains("  Duration: 01:02:05\n"));
        assert!(output.contains("https://stream.mux.com/pb.m3u8?token=t"));
        assert!(!output.contains("Description"));
    }

    #[test]
    fn json_is_the_descriptor() {
        let output = OutputManager::new(false)
            .format_media(&media(), &OutputFormat::JsonCompact)
            .unwrap();
        let parsed: MediaDescriptor = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed, media());
    }

    #[test]
    fn writes_to_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("media.json");
        write_output("{}", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(16106), "04:28:26");
    }
}
