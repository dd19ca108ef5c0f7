use eyre::{Context, Result, bail};

/// Parses fio-style data sizes (`4k`, `64m`, `1G`, plain bytes) into bytes.
pub fn parse_data_size(size: &str) -> Result<u64> {
    let size = size.to_lowercase();
    if let Some(num) = size.strip_suffix('k') {
        Ok(num
            .parse::<u64>()
            .context(format!("Parse data size: {size}"))?
            * 1024)
    } else if let Some(num) = size.strip_suffix('m') {
        Ok(num
            .parse::<u64>()
            .context(format!("Parse data size: {size}"))?
            * 1024
            * 1024)
    } else if let Some(num) = size.strip_suffix('g') {
        Ok(num
            .parse::<u64>()
            .context(format!("Parse data size: {size}"))?
            * 1024
            * 1024
            * 1024)
    } else if !size.is_empty() && size.chars().all(|c| c.is_ascii_digit()) {
        Ok(size
            .parse::<u64>()
            .context(format!("Parse data size: {size}"))?)
    } else {
        bail!("Unsupported data size {size}")
    }
}
