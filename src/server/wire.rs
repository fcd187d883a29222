//! Binary Wire Format
//!
//! One request frame in, one response frame out, then the connection closes. Frames are
//! fixed-size and little-endian:
//!
//! | Frame    | Layout                                              | Size |
//! |----------|-----------------------------------------------------|------|
//! | Request  | `u32 action` (0 = write, 1 = read), `u32 id`        | 8    |
//! | Response | `u32 action`, `u32 counter`, `i64 latency_ns`       | 16   |
//!
//! `read_exact`/`write_all` keep looping over partial reads and writes until a whole
//! frame has moved.

use crate::arbiter::types::Role;

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const REQUEST_LEN: usize = 8;
pub const RESPONSE_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("unknown action code {0}")]
    UnknownAction(u32),
    #[error("negative latency {0} in response frame")]
    NegativeLatency(i64),
    #[error("peer closed the connection mid-frame")]
    Truncated,
    #[error("socket error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for WireError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            WireError::Truncated
        } else {
            WireError::Io(e)
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Action {
    Write,
    Read,
}

impl Action {
    pub fn code(self) -> u32 {
        match self {
            Action::Write => 0,
            Action::Read => 1,
        }
    }

    pub fn from_code(code: u32) -> Result<Self, WireError> {
        match code {
            0 => Ok(Action::Write),
            1 => Ok(Action::Read),
            other => Err(WireError::UnknownAction(other)),
        }
    }

    pub fn role(self) -> Role {
        match self {
            Action::Write => Role::Writer,
            Action::Read => Role::Reader,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request {
    pub action: Action,
    pub id: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Response {
    pub action: Action,
    pub counter: u32,
    /// Time spent waiting for admission to the critical section.
    pub latency_ns: i64,
}

impl Request {
    pub fn new(action: Action, id: u32) -> Self {
        Self { action, id }
    }

    pub fn encode(&self) -> [u8; REQUEST_LEN] {
        let mut frame = [0u8; REQUEST_LEN];
        frame[0..4].copy_from_slice(&self.action.code().to_le_bytes());
        frame[4..8].copy_from_slice(&self.id.to_le_bytes());
        frame
    }

    pub fn decode(frame: &[u8; REQUEST_LEN]) -> Result<Self, WireError> {
        let action = Action::from_code(u32_at(frame, 0))?;
        let id = u32_at(frame, 4);
        Ok(Self { action, id })
    }
}

impl Response {
    pub fn encode(&self) -> [u8; RESPONSE_LEN] {
        let mut frame = [0u8; RESPONSE_LEN];
        frame[0..4].copy_from_slice(&self.action.code().to_le_bytes());
        frame[4..8].copy_from_slice(&self.counter.to_le_bytes());
        frame[8..16].copy_from_slice(&self.latency_ns.to_le_bytes());
        frame
    }

    pub fn decode(frame: &[u8; RESPONSE_LEN]) -> Result<Self, WireError> {
        let action = Action::from_code(u32_at(frame, 0))?;
        let counter = u32_at(frame, 4);

        let mut latency = [0u8; 8];
        latency.copy_from_slice(&frame[8..16]);
        let latency_ns = i64::from_le_bytes(latency);
        if latency_ns < 0 {
            return Err(WireError::NegativeLatency(latency_ns));
        }

        Ok(Self {
            action,
            counter,
            latency_ns,
        })
    }
}

fn u32_at(frame: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&frame[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

pub async fn read_request<R>(reader: &mut R) -> Result<Request, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut frame = [0u8; REQUEST_LEN];
    reader.read_exact(&mut frame).await?;
    Request::decode(&frame)
}

pub async fn write_request<W>(writer: &mut W, request: &Request) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&request.encode()).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_response<R>(reader: &mut R) -> Result<Response, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut frame = [0u8; RESPONSE_LEN];
    reader.read_exact(&mut frame).await?;
    Response::decode(&frame)
}

pub async fn write_response<W>(writer: &mut W, response: &Response) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&response.encode()).await?;
    writer.flush().await?;
    Ok(())
}
