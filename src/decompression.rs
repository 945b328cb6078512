use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Chain, Cursor, Read};
use std::path::Path;

type ChainReader = Chain<Cursor<Vec<u8>>, File>;
type GzipReader = BufReader<MultiGzDecoder<ChainReader>>;
type ZstdReader = BufReader<zstd::Decoder<'static, BufReader<ChainReader>>>;
type PlainReader = BufReader<ChainReader>;

const GZIP_MAGIC: [u8; 3] = [0x1F, 0x8B, 0x08];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Input file reader that transparently decompresses gzip and zstd,
/// detected by magic bytes rather than file extension
pub enum DecompressionReader {
    Gzip(GzipReader),
    Zstd(ZstdReader),
    Plain(PlainReader),
}

impl std::fmt::Debug for DecompressionReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecompressionReader::Gzip(_) => write!(f, "DecompressionReader::Gzip"),
            DecompressionReader::Zstd(_) => write!(f, "DecompressionReader::Zstd"),
            DecompressionReader::Plain(_) => write!(f, "DecompressionReader::Plain"),
        }
    }
}

impl BufRead for DecompressionReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            DecompressionReader::Gzip(reader) => reader.fill_buf(),
            DecompressionReader::Zstd(reader) => reader.fill_buf(),
            DecompressionReader::Plain(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            DecompressionReader::Gzip(reader) => reader.consume(amt),
            DecompressionReader::Zstd(reader) => reader.consume(amt),
            DecompressionReader::Plain(reader) => reader.consume(amt),
        }
    }
}

impl Read for DecompressionReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            DecompressionReader::Gzip(reader) => reader.read(buf),
            DecompressionReader::Zstd(reader) => reader.read(buf),
            DecompressionReader::Plain(reader) => reader.read(buf),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    Gzip,
    Zstd,
    None,
}

fn sniff(head: &[u8]) -> Compression {
    if head.starts_with(&GZIP_MAGIC) {
        Compression::Gzip
    } else if head.starts_with(&ZSTD_MAGIC) {
        Compression::Zstd
    } else {
        Compression::None
    }
}

/// Read up to four bytes for sniffing, then put them back in front
fn peek_head<R: Read>(mut reader: R) -> io::Result<(Compression, Chain<Cursor<Vec<u8>>, R>)> {
    let mut head = [0u8; 4];
    let mut n = 0;
    while n < head.len() {
        match reader.read(&mut head[n..]) {
            Ok(0) => break,
            Ok(read) => n += read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    let kind = sniff(&head[..n]);
    Ok((kind, Cursor::new(head[..n].to_vec()).chain(reader)))
}

/// Wrap any reader (typically stdin) with decompression if its first bytes
/// carry a gzip or zstd signature
pub fn maybe_decompress<R: Read + Send + 'static>(reader: R) -> io::Result<Box<dyn Read + Send>> {
    let (kind, chained) = peek_head(reader)?;
    match kind {
        Compression::Gzip => Ok(Box::new(MultiGzDecoder::new(chained))),
        Compression::Zstd => Ok(Box::new(zstd::Decoder::new(chained)?)),
        Compression::None => Ok(Box::new(chained)),
    }
}

impl DecompressionReader {
    /// Open `path`, detecting compression from its first bytes
    pub fn new<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path_ref = path.as_ref();

        if let Some(extension) = path_ref.extension().and_then(|ext| ext.to_str()) {
            if extension.eq_ignore_ascii_case("zip") {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "ZIP archives are not supported, only gzip and zstd. Extract it first: unzip {}",
                        path_ref.display()
                    ),
                ));
            }
        }

        let file = File::open(path_ref)?;
        let (kind, chained) = peek_head(file)?;
        Ok(match kind {
            Compression::Gzip => DecompressionReader::Gzip(BufReader::new(MultiGzDecoder::new(chained))),
            Compression::Zstd => DecompressionReader::Zstd(BufReader::new(zstd::Decoder::new(chained)?)),
            Compression::None => DecompressionReader::Plain(BufReader::new(chained)),
        })
    }
}
