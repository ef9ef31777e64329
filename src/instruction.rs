use solana_program::program_error::ProgramError;

use crate::codec::Review;

// The actions this program can handle. On the wire each is the codec's
// instruction payload: [discriminant][record fields].
pub enum ReviewInstruction {
    // Create a review PDA for a (reviewer, origin institution) pair
    AddReview(Review),
    // Overwrite an existing review owned by the signer
    UpdateReview(Review),
}

impl ReviewInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        // First byte selects the action (0 = AddReview, 1 = UpdateReview)
        let (&discriminant, rest) = input
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;

        let review =
            Review::decode_fields(rest).map_err(|_| ProgramError::InvalidInstructionData)?;

        Ok(match discriminant {
            0 => Self::AddReview(review),
            1 => Self::UpdateReview(review),
            _ => return Err(ProgramError::InvalidInstructionData),
        })
    }
}
