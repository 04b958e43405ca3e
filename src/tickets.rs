use std::collections::VecDeque;

use cosmwasm_std::Storage;

use crate::{
    error::ContractError,
    evidence::TransactionResult,
    operation::{create_pending_operation, OperationType},
    state::{AVAILABLE_TICKETS, CONFIG, PENDING_TICKET_UPDATE, USED_TICKETS_COUNTER},
};

/// Takes the lowest available ticket for an outbound operation. The last ticket
/// is never handed out here: it is kept so the contract can always emit a ticket
/// replenishment operation of its own.
pub fn allocate_ticket(storage: &mut dyn Storage) -> Result<u64, ContractError> {
    let mut available_tickets = AVAILABLE_TICKETS.load(storage)?;

    if available_tickets.is_empty() {
        return Err(ContractError::NoAvailableTickets {});
    }

    if available_tickets.len() < 2 {
        return Err(ContractError::LastTicketReserved {});
    }

    let ticket = available_tickets.pop_front().unwrap();

    AVAILABLE_TICKETS.save(storage, &available_tickets)?;

    Ok(ticket)
}

/// Bumps the used ticket counter after an outbound operation was created. Once
/// the counter reaches the configured threshold and no allocation is in flight,
/// a ticket replenishment operation is synthesized, consuming one more ticket
/// as its sequence slot.
pub fn register_used_ticket(storage: &mut dyn Storage) -> Result<(), ContractError> {
    let used_tickets = USED_TICKETS_COUNTER.load(storage)? + 1;
    USED_TICKETS_COUNTER.save(storage, &used_tickets)?;

    let config = CONFIG.load(storage)?;

    if used_tickets >= config.used_ticket_sequence_threshold
        && !PENDING_TICKET_UPDATE.load(storage)?
    {
        let mut available_tickets = AVAILABLE_TICKETS.load(storage)?;
        if let Some(ticket_to_update) = available_tickets.pop_front() {
            AVAILABLE_TICKETS.save(storage, &available_tickets)?;

            create_pending_operation(
                storage,
                Some(ticket_to_update),
                None,
                OperationType::AllocateTickets {
                    number: used_tickets,
                },
            )?;
            PENDING_TICKET_UPDATE.save(storage, &true)?;
        }
    }

    Ok(())
}

/// Puts a ticket back into the pool, keeping the pool ordered. Used when an
/// operation turns out Invalid (its ticket was never consumed on XRPL) or when
/// the owner cancels an operation.
pub fn return_ticket(storage: &mut dyn Storage, ticket: u64) -> Result<(), ContractError> {
    let available_tickets = AVAILABLE_TICKETS.load(storage)?;

    let mut tickets: Vec<u64> = available_tickets.into();
    tickets.push(ticket);
    tickets.sort_unstable();

    AVAILABLE_TICKETS.save(storage, &tickets.into())?;

    Ok(())
}

/// Resolution of an AllocateTickets operation. An accepted allocation replaces
/// the pool with the delivered ticket list and resets the used counter.
pub fn handle_ticket_allocation_confirmation(
    storage: &mut dyn Storage,
    tickets: Option<Vec<u64>>,
    transaction_result: &TransactionResult,
) -> Result<(), ContractError> {
    PENDING_TICKET_UPDATE.save(storage, &false)?;

    if transaction_result.eq(&TransactionResult::Accepted) {
        let mut tickets = tickets.ok_or(ContractError::InvalidTicketAllocationEvidence {})?;
        tickets.sort_unstable();

        AVAILABLE_TICKETS.save(storage, &VecDeque::from(tickets))?;
        USED_TICKETS_COUNTER.save(storage, &0)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::{testing::MockStorage, Uint128};

    use crate::{
        relayer::Relayer,
        state::{BridgeState, Config},
    };

    fn setup(storage: &mut MockStorage, tickets: Vec<u64>, threshold: u32) {
        CONFIG
            .save(
                storage,
                &Config {
                    relayers: vec![Relayer {
                        coreum_address: cosmwasm_std::Addr::unchecked("relayer"),
                        xrpl_address: "rrrrrrrrrrrrrrrrrrrrBZbvji".to_owned(),
                        xrpl_pub_key: "key".to_owned(),
                    }],
                    evidence_threshold: 1,
                    used_ticket_sequence_threshold: threshold,
                    trust_set_limit_amount: Uint128::new(1_000_000_000_000_000_000),
                    bridge_xrpl_address: "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh".to_owned(),
                    bridge_state: BridgeState::Active,
                    xrpl_base_fee: 10,
                },
            )
            .unwrap();
        AVAILABLE_TICKETS
            .save(storage, &VecDeque::from(tickets))
            .unwrap();
        USED_TICKETS_COUNTER.save(storage, &0).unwrap();
        PENDING_TICKET_UPDATE.save(storage, &false).unwrap();
    }

    #[test]
    fn allocation_pops_lowest_and_reserves_last() {
        let mut storage = MockStorage::new();
        setup(&mut storage, vec![3, 5, 7], 250);

        assert_eq!(allocate_ticket(&mut storage).unwrap(), 3);
        assert_eq!(allocate_ticket(&mut storage).unwrap(), 5);
        assert_eq!(
            allocate_ticket(&mut storage).unwrap_err(),
            ContractError::LastTicketReserved {}
        );

        AVAILABLE_TICKETS
            .save(&mut storage, &VecDeque::new())
            .unwrap();
        assert_eq!(
            allocate_ticket(&mut storage).unwrap_err(),
            ContractError::NoAvailableTickets {}
        );
    }

    #[test]
    fn used_ticket_threshold_triggers_replenishment() {
        let mut storage = MockStorage::new();
        setup(&mut storage, vec![1, 2, 3, 4], 2);

        register_used_ticket(&mut storage).unwrap();
        assert!(!PENDING_TICKET_UPDATE.load(&storage).unwrap());

        // second used ticket reaches the threshold: ticket 1 is consumed to key
        // the replenishment operation
        register_used_ticket(&mut storage).unwrap();
        assert!(PENDING_TICKET_UPDATE.load(&storage).unwrap());
        assert_eq!(
            AVAILABLE_TICKETS.load(&storage).unwrap(),
            VecDeque::from(vec![2, 3, 4])
        );

        // no second replenishment while one is in flight
        register_used_ticket(&mut storage).unwrap();
        assert_eq!(
            AVAILABLE_TICKETS.load(&storage).unwrap(),
            VecDeque::from(vec![2, 3, 4])
        );
    }

    #[test]
    fn accepted_allocation_replaces_the_pool() {
        let mut storage = MockStorage::new();
        setup(&mut storage, vec![9], 2);
        USED_TICKETS_COUNTER.save(&mut storage, &2).unwrap();
        PENDING_TICKET_UPDATE.save(&mut storage, &true).unwrap();

        handle_ticket_allocation_confirmation(
            &mut storage,
            Some(vec![12, 10, 11]),
            &TransactionResult::Accepted,
        )
        .unwrap();

        assert_eq!(
            AVAILABLE_TICKETS.load(&storage).unwrap(),
            VecDeque::from(vec![10, 11, 12])
        );
        assert_eq!(USED_TICKETS_COUNTER.load(&storage).unwrap(), 0);
        assert!(!PENDING_TICKET_UPDATE.load(&storage).unwrap());
    }

    #[test]
    fn rejected_allocation_only_clears_the_flag() {
        let mut storage = MockStorage::new();
        setup(&mut storage, vec![], 2);
        PENDING_TICKET_UPDATE.save(&mut storage, &true).unwrap();

        handle_ticket_allocation_confirmation(&mut storage, None, &TransactionResult::Rejected)
            .unwrap();

        assert!(AVAILABLE_TICKETS.load(&storage).unwrap().is_empty());
        assert!(!PENDING_TICKET_UPDATE.load(&storage).unwrap());
    }

    #[test]
    fn returned_tickets_keep_the_pool_ordered() {
        let mut storage = MockStorage::new();
        setup(&mut storage, vec![2, 5], 250);

        return_ticket(&mut storage, 3).unwrap();
        assert_eq!(
            AVAILABLE_TICKETS.load(&storage).unwrap(),
            VecDeque::from(vec![2, 3, 5])
        );
    }
}
