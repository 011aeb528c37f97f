//! SOCKS5 client handshake (RFC 1928)
//!
//! Only the "no authentication" method and the CONNECT command are
//! supported. Hostnames are sent to the proxy unresolved so that name
//! lookups happen on the far side of the proxy.

use crate::config::Endpoint;
use crate::error::{RelayError, Result};
use std::net::IpAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

const SOCKS_VERSION: u8 = 0x05;
const METHOD_NO_AUTH: u8 = 0x00;
const METHOD_NONE_ACCEPTABLE: u8 = 0xFF;
const CMD_CONNECT: u8 = 0x01;
const RESERVED: u8 = 0x00;
const ATYP_IPV4: u8 = 0x01;
const ATYP_DOMAIN: u8 = 0x03;
const ATYP_IPV6: u8 = 0x04;
const REPLY_SUCCEEDED: u8 = 0x00;

/// Human-readable text for a SOCKS5 reply code
pub fn reply_message(code: u8) -> &'static str {
    match code {
        0x01 => "general SOCKS server failure",
        0x02 => "connection not allowed by ruleset",
        0x03 => "network unreachable",
        0x04 => "host unreachable",
        0x05 => "connection refused",
        0x06 => "TTL expired",
        0x07 => "command not supported",
        0x08 => "address type not supported",
        _ => "unknown reply code",
    }
}

/// Encode the CONNECT request for `target`
fn connect_request(target: &Endpoint) -> Result<Vec<u8>> {
    let mut request = vec![SOCKS_VERSION, CMD_CONNECT, RESERVED];

    match target.host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => {
            request.push(ATYP_IPV4);
            request.extend_from_slice(&ip.octets());
        }
        Ok(IpAddr::V6(ip)) => {
            request.push(ATYP_IPV6);
            request.extend_from_slice(&ip.octets());
        }
        Err(_) => {
            let len = u8::try_from(target.host.len()).map_err(|_| {
                RelayError::Proxy(format!("hostname too long: {}", target.host))
            })?;
            request.push(ATYP_DOMAIN);
            request.push(len);
            request.extend_from_slice(target.host.as_bytes());
        }
    }

    request.extend_from_slice(&target.port.to_be_bytes());
    Ok(request)
}

/// Negotiate a CONNECT to `target` over an already-open proxy stream
///
/// On success the stream is a transparent tunnel to `target`.
///
/// # Errors
///
/// - [`RelayError::Proxy`] - the proxy refused the method or the CONNECT
/// - [`RelayError::Io`] - the stream failed or closed mid-handshake
pub async fn handshake<S>(stream: &mut S, target: &Endpoint) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // Greeting: one method, no authentication
    stream
        .write_all(&[SOCKS_VERSION, 1, METHOD_NO_AUTH])
        .await?;
    stream.flush().await?;

    let mut choice = [0u8; 2];
    stream.read_exact(&mut choice).await?;
    trace!("SOCKS5 method selection: {:?}", choice);

    if choice[0] != SOCKS_VERSION {
        return Err(RelayError::Proxy(format!(
            "unexpected protocol version {}",
            choice[0]
        )));
    }
    match choice[1] {
        METHOD_NO_AUTH => {}
        METHOD_NONE_ACCEPTABLE => {
            return Err(RelayError::Proxy(
                "no acceptable authentication method".to_string(),
            ));
        }
        other => {
            return Err(RelayError::Proxy(format!(
                "proxy selected unsupported method {}",
                other
            )));
        }
    }

    stream.write_all(&connect_request(target)?).await?;
    stream.flush().await?;

    let mut reply = [0u8; 4];
    stream.read_exact(&mut reply).await?;
    trace!("SOCKS5 reply header: {:?}", reply);

    if reply[0] != SOCKS_VERSION {
        return Err(RelayError::Proxy(format!(
            "unexpected protocol version {}",
            reply[0]
        )));
    }
    if reply[1] != REPLY_SUCCEEDED {
        return Err(RelayError::Proxy(format!(
            "connect to {} failed: {}",
            target,
            reply_message(reply[1])
        )));
    }

    // Drain the bound address and port
    let addr_len = match reply[3] {
        ATYP_IPV4 => 4,
        ATYP_IPV6 => 16,
        ATYP_DOMAIN => {
            let mut len = [0u8; 1];
            stream.read_exact(&mut len).await?;
            usize::from(len[0])
        }
        other => {
            return Err(RelayError::Proxy(format!(
                "unknown address type {} in reply",
                other
            )));
        }
    };
    let mut bound = vec![0u8; addr_len + 2];
    stream.read_exact(&mut bound).await?;

    Ok(())
}
