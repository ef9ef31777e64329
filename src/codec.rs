// Wire codec for the review record
//
// Two layouts share the same field body:
//   instruction payload: [action discriminant: u8][fields]
//   account payload:     [initialized flag: u8][fields]
// Strings are a u32 little-endian byte length followed by UTF-8 content,
// the skills list is a u32 little-endian count followed by its elements,
// salaries are u64 little-endian, rating is a single byte. The field order
// below is the wire order; stored accounts depend on it.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::msg;
use thiserror::Error;

// One institutional-transition review, as submitted by a reviewer and as
// stored on-chain behind the initialized flag
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub from_institution: String,
    pub from_state_province: String,
    pub from_country: String,
    pub to_institution: String,
    pub to_country: String,
    pub date_started: String,
    pub date_ended: String,
    pub ending_salary: u64,
    pub ending_currency: String,
    pub new_salary: u64,
    pub new_currency: String,
    pub date_transferred: String,
    pub skills_earned: Vec<String>,
    pub description: String,
    pub rating: u8,
    pub behaviour: String,
    pub created_at: String,
}

// Why a single decode can fail. Failures are per-buffer: the caller scanning
// many accounts drops the bad one and keeps going.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Buffer ends before the field at offset {0}")]
    MalformedInput(usize),

    #[error("Text field at offset {0} is not valid UTF-8")]
    InvalidText(usize),
}

impl Review {
    /// Exact encoded size of either wire variant (leading byte included).
    pub fn encoded_len(&self) -> usize {
        let text = |s: &String| 4 + s.len();
        1 + text(&self.from_institution)
            + text(&self.from_state_province)
            + text(&self.from_country)
            + text(&self.to_institution)
            + text(&self.to_country)
            + text(&self.date_started)
            + text(&self.date_ended)
            + 8
            + text(&self.ending_currency)
            + 8
            + text(&self.new_currency)
            + text(&self.date_transferred)
            + 4
            + self.skills_earned.iter().map(|s| 4 + s.len()).sum::<usize>()
            + text(&self.description)
            + 1
            + text(&self.behaviour)
            + text(&self.created_at)
    }

    /// Serializes the record as an instruction payload behind the caller's
    /// action discriminant (0 = add, 1 = update).
    pub fn encode_instruction(&self, discriminant: u8) -> Vec<u8> {
        self.encode_with_lead_byte(discriminant)
    }

    /// Serializes the record as an account payload behind an initialized
    /// flag of 1.
    pub fn encode_account(&self) -> Vec<u8> {
        self.encode_with_lead_byte(1)
    }

    fn encode_with_lead_byte(&self, lead: u8) -> Vec<u8> {
        // exact-size allocation, so the result never carries trailing bytes
        let mut out = Vec::with_capacity(self.encoded_len());
        out.push(lead);
        self.write_fields(&mut out);
        out
    }

    fn write_fields(&self, out: &mut Vec<u8>) {
        write_text(out, &self.from_institution);
        write_text(out, &self.from_state_province);
        write_text(out, &self.from_country);
        write_text(out, &self.to_institution);
        write_text(out, &self.to_country);
        write_text(out, &self.date_started);
        write_text(out, &self.date_ended);
        out.extend_from_slice(&self.ending_salary.to_le_bytes());
        write_text(out, &self.ending_currency);
        out.extend_from_slice(&self.new_salary.to_le_bytes());
        write_text(out, &self.new_currency);
        write_text(out, &self.date_transferred);
        out.extend_from_slice(&(self.skills_earned.len() as u32).to_le_bytes());
        for skill in &self.skills_earned {
            write_text(out, skill);
        }
        write_text(out, &self.description);
        out.push(self.rating);
        write_text(out, &self.behaviour);
        write_text(out, &self.created_at);
    }

    /// Decodes an account payload. An empty buffer is an absent record
    /// (`Ok(None)`), not an error. Bytes past the final field are ignored,
    /// since on-chain accounts are fixed-size and zero-padded. Never returns
    /// a partial record.
    pub fn decode_account(data: &[u8]) -> Result<Option<Self>, CodecError> {
        if data.is_empty() {
            return Ok(None);
        }
        let mut reader = Reader::new(data);
        let _initialized = reader.read_u8()?;
        Ok(Some(Self::read_fields(&mut reader)?))
    }

    /// Decodes the field body of an instruction payload, after the caller
    /// has split off the discriminant byte.
    pub fn decode_fields(data: &[u8]) -> Result<Self, CodecError> {
        Self::read_fields(&mut Reader::new(data))
    }

    fn read_fields(r: &mut Reader) -> Result<Self, CodecError> {
        Ok(Self {
            from_institution: r.read_text()?,
            from_state_province: r.read_text()?,
            from_country: r.read_text()?,
            to_institution: r.read_text()?,
            to_country: r.read_text()?,
            date_started: r.read_text()?,
            date_ended: r.read_text()?,
            ending_salary: r.read_u64()?,
            ending_currency: r.read_text()?,
            new_salary: r.read_u64()?,
            new_currency: r.read_text()?,
            date_transferred: r.read_text()?,
            skills_earned: r.read_text_vec()?,
            description: r.read_text()?,
            rating: r.read_u8()?,
            behaviour: r.read_text()?,
            created_at: r.read_text()?,
        })
    }
}

/// Decodes a batch of scanned account buffers, dropping every buffer that
/// holds no record or fails to decode. One bad account never aborts the scan.
pub fn collect_reviews<'a, I>(buffers: I) -> Vec<Review>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    buffers
        .into_iter()
        .filter_map(|data| match Review::decode_account(data) {
            Ok(review) => review,
            Err(err) => {
                msg!("Skipping undecodable review account: {}", err);
                None
            }
        })
        .collect()
}

fn write_text(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

// Bounds-checked cursor over an account buffer
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .pos
            .checked_add(len)
            .ok_or(CodecError::MalformedInput(self.pos))?;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(CodecError::MalformedInput(self.pos))?;
        self.pos = end;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64(&mut self) -> Result<u64, CodecError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn read_text(&mut self) -> Result<String, CodecError> {
        let len = self.read_u32()? as usize;
        let at = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidText(at))
    }

    fn read_text_vec(&mut self) -> Result<Vec<String>, CodecError> {
        let count = self.read_u32()? as usize;
        // the count is untrusted input, so capacity grows with the elements
        // that actually decode
        let mut items = Vec::new();
        for _ in 0..count {
            items.push(self.read_text()?);
        }
        Ok(items)
    }
}
