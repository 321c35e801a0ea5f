use std::fs;
use std::io::Read;

use bytes::BytesMut;
use delimprims_frame::{encode_message, DelimiterPattern};

use crate::cmd::{unescape_delimiter, FrameArgs};
use crate::exit::{framer_error, io_error, CliResult, SUCCESS};
use crate::output::{print_raw, OutputFormat};

pub fn run(args: FrameArgs, _format: OutputFormat) -> CliResult<i32> {
    let begin = unescape_delimiter(&args.begin)?;
    let end = unescape_delimiter(&args.end)?;
    let patterns = vec![DelimiterPattern::new(begin, end)];

    let payload = resolve_payload(&args)?;

    let mut wire = BytesMut::new();
    encode_message(&patterns, 0, &payload, &mut wire)
        .map_err(|err| framer_error("frame failed", err))?;

    print_raw(&wire);
    Ok(SUCCESS)
}

fn resolve_payload(args: &FrameArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }

    let mut payload = Vec::new();
    std::io::stdin()
        .read_to_end(&mut payload)
        .map_err(|err| io_error("failed reading stdin", err))?;
    Ok(payload)
}
