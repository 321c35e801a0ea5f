use std::fs::File;
use std::io::Read;

use delimprims_frame::{DelimiterPattern, Framer, FramerConfig, FramerError, MessageReader};
use tracing::debug;

use crate::cmd::{parse_pattern, DeframeArgs};
use crate::exit::{framer_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: DeframeArgs, format: OutputFormat) -> CliResult<i32> {
    let patterns = args
        .patterns
        .iter()
        .map(|spec| parse_pattern(spec))
        .collect::<CliResult<Vec<DelimiterPattern>>>()?;

    let config = FramerConfig {
        max_message_size: (args.max_size > 0).then_some(args.max_size),
    };
    let framer =
        Framer::new(patterns, config).map_err(|err| framer_error("invalid pattern set", err))?;

    let stream: Box<dyn Read> = match &args.file {
        Some(path) => Box::new(
            File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?,
        ),
        None => Box::new(std::io::stdin().lock()),
    };
    let mut reader = MessageReader::new(stream, framer);

    let mut extracted = 0usize;
    loop {
        let message = match reader.read_message() {
            Ok(message) => message,
            Err(FramerError::ConnectionClosed) => {
                if !reader.framer().is_idle() {
                    return Err(CliError::new(DATA_INVALID, "stream ended inside a message"));
                }
                break;
            }
            Err(err) => return Err(framer_error("deframe failed", err)),
        };

        print_message(&message, format);
        extracted = extracted.saturating_add(1);

        if let Some(count) = args.count {
            if extracted >= count {
                break;
            }
        }
    }

    debug!(extracted, "deframe complete");
    Ok(SUCCESS)
}
