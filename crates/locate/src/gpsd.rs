use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, instrument};
use vigil_core::Location;

use crate::error::LookupError;

const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true};\n";

/// Minimum gpsd fix mode carrying a usable horizontal position (2D).
const MIN_FIX_MODE: u8 = 2;

/// Native positioning through a local gpsd daemon.
///
/// Connects, enables JSON watch mode, and returns the first TPV report
/// with at least a 2D fix. The caller bounds the wait; gpsd streams
/// reports indefinitely while a receiver is attached.
#[derive(Debug, Clone)]
pub struct GpsdSensor {
    addr: String,
}

#[derive(Debug, Deserialize)]
struct Tpv {
    class: String,
    #[serde(default)]
    mode: u8,
    lat: Option<f64>,
    lon: Option<f64>,
    eph: Option<f64>,
    epx: Option<f64>,
    epy: Option<f64>,
}

impl GpsdSensor {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Wait for the first usable position fix.
    #[instrument(skip(self), fields(addr = %self.addr))]
    pub async fn locate(&self) -> Result<Location, LookupError> {
        let stream = TcpStream::connect(&self.addr).await?;
        let (read, mut write) = stream.into_split();
        write.write_all(WATCH_COMMAND).await?;

        let mut lines = BufReader::new(read).lines();
        while let Some(line) = lines.next_line().await? {
            if let Some(location) = parse_fix(&line) {
                debug!("gpsd reported a fix");
                return Ok(location);
            }
        }
        Err(LookupError::NoFix)
    }
}

/// Parse one gpsd JSON line into a coordinate fix.
///
/// Returns `None` for non-TPV classes, fixes below 2D, lines without a
/// position, and lines without any horizontal error estimate.
fn parse_fix(line: &str) -> Option<Location> {
    let tpv: Tpv = serde_json::from_str(line).ok()?;
    if tpv.class != "TPV" || tpv.mode < MIN_FIX_MODE {
        return None;
    }
    let accuracy_m = tpv.eph.or_else(|| match (tpv.epx, tpv.epy) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, y) => x.or(y),
    })?;
    Some(Location::Coordinates {
        lat: tpv.lat?,
        lng: tpv.lon?,
        accuracy_m,
    })
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn tpv_with_eph_uses_it_as_accuracy() {
        let line = r#"{"class":"TPV","mode":3,"lat":59.9139,"lon":10.7522,"eph":4.5}"#;
        assert_eq!(
            parse_fix(line),
            Some(Location::Coordinates {
                lat: 59.9139,
                lng: 10.7522,
                accuracy_m: 4.5
            })
        );
    }

    #[test]
    fn tpv_without_eph_uses_the_larger_axis_error() {
        let line = r#"{"class":"TPV","mode":2,"lat":1.0,"lon":2.0,"epx":3.0,"epy":7.5}"#;
        assert_eq!(
            parse_fix(line),
            Some(Location::Coordinates {
                lat: 1.0,
                lng: 2.0,
                accuracy_m: 7.5
            })
        );
    }

    #[test]
    fn unusable_lines_are_skipped() {
        for line in [
            r#"{"class":"VERSION","release":"3.25"}"#,
            r#"{"class":"TPV","mode":1}"#,
            r#"{"class":"TPV","mode":3,"lat":1.0,"eph":2.0}"#,
            r#"{"class":"TPV","mode":3,"lat":1.0,"lon":2.0}"#,
            "not json",
        ] {
            assert_eq!(parse_fix(line), None, "{line}");
        }
    }

    #[tokio::test]
    async fn locate_reads_until_the_first_fix() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            let n = socket.read(&mut buf).await.unwrap();
            assert!(buf[..n].starts_with(b"?WATCH="));
            socket
                .write_all(
                    b"{\"class\":\"VERSION\"}\n\
                      {\"class\":\"TPV\",\"mode\":1}\n\
                      {\"class\":\"TPV\",\"mode\":3,\"lat\":10.5,\"lon\":-3.25,\"eph\":12.0}\n",
                )
                .await
                .unwrap();
        });

        let location = GpsdSensor::new(addr.to_string()).locate().await.unwrap();
        server.await.unwrap();

        assert_eq!(
            location,
            Location::Coordinates {
                lat: 10.5,
                lng: -3.25,
                accuracy_m: 12.0
            }
        );
    }

    #[tokio::test]
    async fn closed_stream_without_fix_is_no_fix() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            socket.read(&mut buf).await.unwrap();
            socket
                .write_all(b"{\"class\":\"TPV\",\"mode\":1}\n")
                .await
                .unwrap();
        });

        let err = GpsdSensor::new(addr.to_string()).locate().await.unwrap_err();
        assert!(matches!(err, LookupError::NoFix));
    }
}
