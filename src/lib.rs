// Module declarations - organize code into separate files
pub mod codec; // Wire codec for the review record
pub mod instruction; // Instruction parsing and types
pub mod state; // Account state structures and errors

use crate::codec::Review;
use crate::instruction::ReviewInstruction;
use crate::state::AccountState;
use crate::state::ReviewError;
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint,
    entrypoint::ProgramResult,
    msg,
    program::invoke_signed,
    program_error::ProgramError,
    program_pack::IsInitialized,
    pubkey::Pubkey,
    sysvar::rent::Rent,
};
use solana_system_interface::instruction as system_instruction;
use std::convert::TryInto;

entrypoint!(process_instruction);

// Main entry point for all instructions sent to this program
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = ReviewInstruction::unpack(instruction_data)?;
    match instruction {
        ReviewInstruction::AddReview(review) => add_review(program_id, accounts, review),
        ReviewInstruction::UpdateReview(review) => update_review(program_id, accounts, review),
    }
}

// Handler for adding a new transition review
// Creates a PDA account to store the review data
pub fn add_review(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    review: Review,
) -> ProgramResult {
    msg!("Adding review...");
    msg!(
        "From: {} ({}, {})",
        review.from_institution,
        review.from_state_province,
        review.from_country
    );
    msg!("To: {} ({})", review.to_institution, review.to_country);
    msg!(
        "Tenure: {} to {}, transferred {}",
        review.date_started,
        review.date_ended,
        review.date_transferred
    );
    msg!(
        "Salary: {} {} to {} {}",
        review.ending_salary,
        review.ending_currency,
        review.new_salary,
        review.new_currency
    );
    msg!("Skills earned: {:?}", review.skills_earned);
    msg!("Rating: {}", review.rating);
    msg!("Behaviour: {}", review.behaviour);
    msg!("Description: {}", review.description);
    msg!("Created at: {}", review.created_at);

    let account_info_iter = &mut accounts.iter();

    // Expected accounts in order:
    let initializer = next_account_info(account_info_iter)?; // Reviewer (signer, pays rent)
    let pda_account = next_account_info(account_info_iter)?; // PDA to store review data
    let system_program = next_account_info(account_info_iter)?; // System program for account creation

    if !initializer.is_signer {
        msg!("Missing required signature");
        return Err(ProgramError::MissingRequiredSignature);
    }

    // The origin institution is the seed, so each reviewer holds one review
    // per institution they transitioned from
    let (pda, bump_seed) = Pubkey::find_program_address(
        &[initializer.key.as_ref(), review.from_institution.as_bytes()],
        program_id,
    );
    if pda != *pda_account.key {
        msg!("Invalid seeds for PDA");
        return Err(ProgramError::InvalidArgument);
    }

    // Rating bounds live here, not in the codec
    if review.rating > 10 || review.rating < 1 {
        return Err(ReviewError::InvalidRating.into());
    }

    // Fixed account size, large enough for the record and later updates
    let account_len: usize = 1000;

    // Note: In tests, Rent::get() may fail with UnsupportedSysvar
    // Using Rent::default() provides standard rent parameters
    let rent = Rent::default();
    let rent_lamports = rent.minimum_balance(account_len);

    // Create the PDA account via CPI to the System Program
    invoke_signed(
        &system_instruction::create_account(
            initializer.key,
            pda_account.key,
            rent_lamports,
            account_len.try_into().unwrap(),
            program_id,
        ),
        &[
            initializer.clone(),
            pda_account.clone(),
            system_program.clone(),
        ],
        &[&[
            initializer.key.as_ref(),
            review.from_institution.as_bytes(),
            &[bump_seed],
        ]],
    )?;

    msg!("PDA created: {}", pda);

    // The freshly created account starts zeroed, so build the state directly
    let account_data = AccountState {
        is_initialized: true,
        review,
    };

    msg!("Serializing state account");
    account_data.serialize(&mut &mut pda_account.data.borrow_mut()[..])?;
    msg!("State account serialized");

    Ok(())
}

// Handler for updating an existing transition review
// Only the original reviewer can update, proven by PDA re-derivation
pub fn update_review(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    review: Review,
) -> ProgramResult {
    msg!("Updating review...");

    let account_info_iter = &mut accounts.iter();

    // Expected accounts:
    let initializer = next_account_info(account_info_iter)?; // Original reviewer (signer)
    let pda_account = next_account_info(account_info_iter)?; // Existing review PDA

    if pda_account.owner != program_id {
        return Err(ProgramError::IllegalOwner);
    }
    if !initializer.is_signer {
        msg!("Missing required signature");
        return Err(ProgramError::MissingRequiredSignature);
    }

    msg!("Unpacking state account");
    // deserialize rather than try_from_slice: the account is larger than the
    // serialized record
    let mut account_data = AccountState::deserialize(&mut &pda_account.data.borrow()[..])
        .map_err(|_| ProgramError::InvalidAccountData)?;

    // The stored origin institution seeded the PDA; re-deriving it with the
    // signer's key proves the signer wrote this review
    let (pda, _bump_seed) = Pubkey::find_program_address(
        &[
            initializer.key.as_ref(),
            account_data.review.from_institution.as_bytes(),
        ],
        program_id,
    );
    if pda != *pda_account.key {
        msg!("Invalid seeds for PDA");
        return Err(ReviewError::InvalidPDA.into());
    }

    msg!("Checking if account is initialized");
    if !account_data.is_initialized() {
        msg!("Account is not initialized");
        return Err(ReviewError::UninitializedAccount.into());
    }

    if review.rating > 10 || review.rating < 1 {
        return Err(ReviewError::InvalidRating.into());
    }

    msg!("Review before update:");
    msg!("From Institution: {}", account_data.review.from_institution);
    msg!("Rating: {}", account_data.review.rating);
    msg!("Description: {}", account_data.review.description);
    msg!("Behaviour: {}", account_data.review.behaviour);

    account_data.review = review;

    msg!("Review after update:");
    msg!("From Institution: {}", account_data.review.from_institution);
    msg!("Rating: {}", account_data.review.rating);
    msg!("Description: {}", account_data.review.description);
    msg!("Behaviour: {}", account_data.review.behaviour);

    msg!("Serializing state account");
    account_data.serialize(&mut &mut pda_account.data.borrow_mut()[..])?;
    msg!("State account serialized");

    Ok(())
}
