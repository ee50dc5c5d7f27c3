//! Cursor based transaction paging
//!
//! The backend pages newest-first with opaque cursors: `before=<nextCursor>`
//! walks to older items and `after=<prevCursor>` walks back to newer ones.
//! Only the cursor matching the direction of travel is reliable, so a reply
//! to a "newer" request may carry an empty `nextCursor` even though older
//! pages exist. [`TransactionPager`] keeps a stack with the cursor pair of
//! every visited page and restores it when stepping back.

use serde_json::Value;
use tracing::{debug, warn};

use crate::api::bank::models::{TransactionRow, TransactionsPageResponse};
use crate::api::bank::{clamp_limit, ApiReply, PageQuery};
use crate::models::transaction::format_timestamp;
use crate::models::TransactionItem;
use crate::utils::errors::AppError;

pub const PAGE_SIZE: i64 = 10;

pub const MSG_LOAD_FAILED: &str = "Failed to load transactions";
pub const MSG_NO_TRANSACTIONS: &str = "No transactions";
pub const MSG_END_OF_DATA: &str = "No more transactions";

/// One decoded transactions page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    pub items: Vec<TransactionItem>,
    pub next_cursor: String,
    pub prev_cursor: String,
}

/// Decode a transactions reply, accepting the cursor object and the legacy bare array
pub fn decode_page(reply: &ApiReply) -> Result<PageResult, AppError> {
    if reply.is_network_failure() {
        return Err(AppError::Network(reply.error_or(MSG_LOAD_FAILED)));
    }
    if !reply.ok {
        return Err(AppError::Request(reply.error_or(MSG_LOAD_FAILED)));
    }

    match &reply.body {
        Some(Value::Array(rows)) => {
            let rows: Vec<TransactionRow> = serde_json::from_value(Value::Array(rows.clone()))
                .map_err(|e| {
                    warn!("Malformed legacy transactions list: {}", e);
                    AppError::invalid_response()
                })?;
            Ok(PageResult {
                items: rows.into_iter().map(to_item).collect(),
                ..Default::default()
            })
        }
        Some(body @ Value::Object(_)) => {
            let page: TransactionsPageResponse = serde_json::from_value(body.clone()).map_err(|e| {
                warn!("Malformed transactions page: {}", e);
                AppError::invalid_response()
            })?;
            Ok(PageResult {
                items: page.items.into_iter().map(to_item).collect(),
                next_cursor: page.next_cursor.unwrap_or_default(),
                prev_cursor: page.prev_cursor.unwrap_or_default(),
            })
        }
        _ => Err(AppError::invalid_response()),
    }
}

fn to_item(row: TransactionRow) -> TransactionItem {
    TransactionItem {
        date: format_timestamp(row.created_at.as_deref().unwrap_or_default()),
        tx_type: row.tx_type.unwrap_or_default(),
        amount: row.amount.map(|a| a.to_string()).unwrap_or_default(),
    }
}

/// Navigation that produced the fetch currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastMove {
    #[default]
    None,
    First,
    Next,
    Prev,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CursorPair {
    next: String,
    prev: String,
}

/// Everything a navigation intent mutates before its reply arrives
#[derive(Debug, Clone, Default)]
struct Position {
    /// 0 is the newest page
    page_index: usize,
    cursors: CursorPair,
    /// One entry per page left behind by `load_next`; empty iff `page_index == 0`
    history: Vec<CursorPair>,
}

/// What the view should do with a fetch result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageUpdate {
    /// Show these rows, numbering from `first_row`
    Rendered {
        items: Vec<TransactionItem>,
        first_row: usize,
    },
    /// The account has no transactions at all; show an empty list
    NoTransactions,
    /// Nothing further in the requested direction; the current page stays
    EndOfData { notify: bool },
    /// The request failed; state is as before the navigation
    Failed(AppError),
    /// No fetch was in flight
    Ignored,
}

#[derive(Debug)]
pub struct TransactionPager {
    page_size: i64,
    position: Position,
    last_move: LastMove,
    has_any_transactions: bool,
    empty_notice_shown: bool,
    view_active: bool,
    busy: bool,
    /// Position before the in-flight navigation
    undo: Option<Position>,
}

impl Default for TransactionPager {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl TransactionPager {
    pub fn new(page_size: i64) -> Self {
        Self {
            page_size: clamp_limit(page_size),
            position: Position::default(),
            last_move: LastMove::None,
            has_any_transactions: true,
            empty_notice_shown: false,
            view_active: false,
            busy: false,
            undo: None,
        }
    }

    pub fn page_index(&self) -> usize {
        self.position.page_index
    }

    #[cfg(test)]
    pub fn next_cursor(&self) -> &str {
        &self.position.cursors.next
    }

    #[cfg(test)]
    pub fn prev_cursor(&self) -> &str {
        &self.position.cursors.prev
    }

    #[cfg(test)]
    pub fn last_move(&self) -> LastMove {
        self.last_move
    }

    #[cfg(test)]
    pub fn has_any_transactions(&self) -> bool {
        self.has_any_transactions
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn can_go_next(&self) -> bool {
        !self.position.cursors.next.is_empty()
    }

    pub fn can_go_prev(&self) -> bool {
        self.position.page_index > 0 && !self.position.cursors.prev.is_empty()
    }

    /// Row number of the first item on the current page
    pub fn first_row(&self) -> usize {
        self.position.page_index * self.page_size as usize + 1
    }

    /// Start over from the newest page
    pub fn load_first(&mut self) -> Option<PageQuery> {
        if self.busy {
            debug!("load_first ignored, fetch in flight");
            return None;
        }
        self.begin(LastMove::First);
        self.position = Position::default();
        Some(PageQuery::first(self.page_size))
    }

    /// Step to older items
    pub fn load_next(&mut self) -> Option<PageQuery> {
        if self.busy || !self.can_go_next() {
            debug!("load_next ignored (busy: {})", self.busy);
            return None;
        }
        self.begin(LastMove::Next);
        let cursors = self.position.cursors.clone();
        let query = PageQuery::older_than(self.page_size, &cursors.next);
        self.position.history.push(cursors);
        self.position.page_index += 1;
        Some(query)
    }

    /// Step back to newer items, pre-seeding `nextCursor` from history
    pub fn load_prev(&mut self) -> Option<PageQuery> {
        if self.busy || !self.can_go_prev() {
            debug!("load_prev ignored (busy: {})", self.busy);
            return None;
        }
        self.begin(LastMove::Prev);
        let query = PageQuery::newer_than(self.page_size, &self.position.cursors.prev);
        if let Some(previous) = self.position.history.pop() {
            self.position.cursors.next = previous.next;
        }
        self.position.page_index -= 1;
        Some(query)
    }

    fn begin(&mut self, movement: LastMove) {
        self.undo = Some(self.position.clone());
        self.last_move = movement;
        self.busy = true;
    }

    /// Reconcile the reply to the fetch in flight
    pub fn on_fetch_result(&mut self, result: Result<PageResult, AppError>) -> PageUpdate {
        if !self.busy {
            debug!("Page result with no fetch in flight, dropped");
            return PageUpdate::Ignored;
        }
        self.busy = false;
        let movement = std::mem::take(&mut self.last_move);
        let undo = self.undo.take();

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                warn!("Transactions fetch failed: {}", e);
                if let Some(position) = undo {
                    self.position = position;
                }
                return PageUpdate::Failed(e);
            }
        };

        if page.items.is_empty() {
            return self.on_empty_page(movement, undo);
        }

        self.has_any_transactions = true;
        self.empty_notice_shown = false;

        let cursors = &mut self.position.cursors;
        if movement != LastMove::Prev || !page.next_cursor.is_empty() {
            cursors.next = page.next_cursor;
        }
        cursors.prev = page.prev_cursor;

        debug!(
            "Page {} loaded with {} item(s), next: {}, prev: {}",
            self.position.page_index,
            page.items.len(),
            self.can_go_next(),
            self.can_go_prev()
        );

        PageUpdate::Rendered {
            items: page.items,
            first_row: self.first_row(),
        }
    }

    fn on_empty_page(&mut self, movement: LastMove, undo: Option<Position>) -> PageUpdate {
        match movement {
            LastMove::Next | LastMove::Prev => {
                if let Some(position) = undo {
                    self.position = position;
                }
                if movement == LastMove::Next {
                    self.position.cursors.next.clear();
                }
                debug!("End of data reached going {:?}", movement);
                PageUpdate::EndOfData {
                    notify: self.view_active,
                }
            }
            LastMove::First | LastMove::None => {
                self.has_any_transactions = false;
                self.position = Position::default();
                PageUpdate::NoTransactions
            }
        }
    }

    /// Mark the transactions view as shown or hidden.
    ///
    /// Returns true when the "no transactions" notice should be shown now,
    /// which happens at most once until a non-empty page arrives.
    pub fn set_view_active(&mut self, active: bool) -> bool {
        self.view_active = active;
        if active && !self.busy && !self.has_any_transactions && !self.empty_notice_shown {
            self.empty_notice_shown = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(label: &str) -> TransactionItem {
        TransactionItem {
            date: String::new(),
            tx_type: label.to_string(),
            amount: "20".to_string(),
        }
    }

    fn page(labels: &[&str], next: &str, prev: &str) -> Result<PageResult, AppError> {
        Ok(PageResult {
            items: labels.iter().map(|l| item(l)).collect(),
            next_cursor: next.to_string(),
            prev_cursor: prev.to_string(),
        })
    }

    fn assert_history_invariant(pager: &TransactionPager) {
        assert_eq!(pager.page_index() == 0, pager.position.history.is_empty());
    }

    #[test]
    fn test_round_trip_restores_next_optimistically() {
        let mut pager = TransactionPager::new(10);
        assert_eq!(pager.load_first(), Some(PageQuery::first(10)));
        assert!(matches!(pager.on_fetch_result(page(&["A", "B"], "c2", "")), PageUpdate::Rendered { first_row: 1, .. }));
        assert!(pager.can_go_next());
        assert!(!pager.can_go_prev());

        assert_eq!(pager.load_next(), Some(PageQuery::older_than(10, "c2")));
        let update = pager.on_fetch_result(page(&["C"], "c3", "c1"));
        assert_eq!(
            update,
            PageUpdate::Rendered {
                items: vec![item("C")],
                first_row: 11
            }
        );
        assert_eq!(pager.page_index(), 1);
        assert!(pager.can_go_prev());

        assert_eq!(pager.load_prev(), Some(PageQuery::newer_than(10, "c1")));
        assert!(pager.is_busy());
        assert_eq!(pager.page_index(), 0);
        assert!(pager.can_go_next());
        assert_eq!(pager.next_cursor(), "c2");
        assert_history_invariant(&pager);
    }

    #[test]
    fn test_prev_keeps_restored_cursor_when_server_omits_next() {
        let mut pager = TransactionPager::new(10);
        pager.load_first();
        pager.on_fetch_result(page(&["A"], "c2", ""));
        pager.load_next();
        pager.on_fetch_result(page(&["B"], "c3", "c1"));
        pager.load_prev();
        pager.on_fetch_result(page(&["A"], "", "c0"));

        assert_eq!(pager.next_cursor(), "c2");
        assert_eq!(pager.prev_cursor(), "c0");
        assert!(pager.can_go_next());
        assert!(!pager.can_go_prev());
    }

    #[test]
    fn test_prev_takes_fresh_next_cursor() {
        let mut pager = TransactionPager::new(10);
        pager.load_first();
        pager.on_fetch_result(page(&["A"], "c2", ""));
        pager.load_next();
        pager.on_fetch_result(page(&["B"], "c3", "c1"));
        pager.load_prev();
        pager.on_fetch_result(page(&["A"], "c2-fresh", "c0"));
        assert_eq!(pager.next_cursor(), "c2-fresh");
    }

    #[test]
    fn test_next_overwrites_with_empty_cursor_at_oldest_edge() {
        let mut pager = TransactionPager::new(10);
        pager.load_first();
        pager.on_fetch_result(page(&["A"], "c2", ""));
        pager.load_next();
        pager.on_fetch_result(page(&["B"], "", "c1"));
        assert!(!pager.can_go_next());
        assert!(pager.can_go_prev());
        assert_eq!(pager.load_next(), None);
    }

    #[test]
    fn test_single_fetch_in_flight() {
        let mut pager = TransactionPager::new(10);
        pager.load_first();
        pager.on_fetch_result(page(&["A"], "c2", ""));

        assert!(pager.load_next().is_some());
        assert!(pager.load_next().is_none());
        assert!(pager.load_prev().is_none());
        assert!(pager.load_first().is_none());
        assert_eq!(pager.page_index(), 1);
        assert_eq!(pager.position.history.len(), 1);
    }

    #[test]
    fn test_result_without_fetch_is_ignored() {
        let mut pager = TransactionPager::new(10);
        assert_eq!(pager.on_fetch_result(page(&["A"], "c2", "")), PageUpdate::Ignored);
        assert!(!pager.can_go_next());
    }

    #[test]
    fn test_empty_first_page_defers_notice() {
        let mut pager = TransactionPager::new(10);
        pager.set_view_active(true);
        pager.load_first();
        assert_eq!(pager.on_fetch_result(page(&[], "", "")), PageUpdate::NoTransactions);
        assert!(!pager.has_any_transactions());
        assert!(!pager.can_go_next());
        assert!(!pager.can_go_prev());
        assert_eq!(pager.last_move(), LastMove::None);

        pager.set_view_active(false);
        assert!(pager.set_view_active(true));
        assert!(!pager.set_view_active(true));
    }

    #[test]
    fn test_notice_guard_resets_after_items() {
        let mut pager = TransactionPager::new(10);
        pager.load_first();
        pager.on_fetch_result(page(&[], "", ""));
        assert!(pager.set_view_active(true));

        pager.load_first();
        pager.on_fetch_result(page(&["A"], "", ""));
        assert!(pager.has_any_transactions());

        pager.load_first();
        pager.on_fetch_result(page(&[], "", ""));
        assert!(pager.set_view_active(true));
    }

    #[test]
    fn test_end_of_data_going_next() {
        let mut pager = TransactionPager::new(10);
        pager.load_first();
        pager.on_fetch_result(page(&["A"], "c2", ""));
        pager.load_next();
        pager.on_fetch_result(page(&["B"], "c3", "c1"));

        pager.set_view_active(true);
        pager.load_next();
        assert_eq!(pager.on_fetch_result(page(&[], "", "")), PageUpdate::EndOfData { notify: true });
        assert!(!pager.can_go_next());
        assert_eq!(pager.prev_cursor(), "c1");
        assert_eq!(pager.page_index(), 1);
        assert!(pager.has_any_transactions());
        assert_history_invariant(&pager);
    }

    #[test]
    fn test_end_of_data_silent_when_view_inactive() {
        let mut pager = TransactionPager::new(10);
        pager.load_first();
        pager.on_fetch_result(page(&["A"], "c2", ""));
        pager.load_next();
        assert_eq!(pager.on_fetch_result(page(&[], "", "")), PageUpdate::EndOfData { notify: false });
        assert_eq!(pager.page_index(), 0);
        assert_history_invariant(&pager);
    }

    #[test]
    fn test_error_leaves_position_untouched() {
        let mut pager = TransactionPager::new(10);
        pager.load_first();
        pager.on_fetch_result(page(&["A"], "c2", ""));
        pager.load_next();

        let update = pager.on_fetch_result(Err(AppError::Network("unreachable".to_string())));
        assert!(matches!(update, PageUpdate::Failed(AppError::Network(_))));
        assert!(!pager.is_busy());
        assert_eq!(pager.page_index(), 0);
        assert_eq!(pager.next_cursor(), "c2");
        assert_history_invariant(&pager);

        assert_eq!(pager.load_next(), Some(PageQuery::older_than(10, "c2")));
    }

    fn on_second_page() -> TransactionPager {
        let mut pager = TransactionPager::new(10);
        pager.load_first();
        pager.on_fetch_result(page(&["A"], "c2", ""));
        pager.load_next();
        pager.on_fetch_result(page(&["B"], "c3", "c1"));
        pager
    }

    #[test]
    fn test_end_of_data_going_prev() {
        let mut pager = on_second_page();
        assert_eq!(pager.load_prev(), Some(PageQuery::newer_than(10, "c1")));
        assert_eq!(pager.on_fetch_result(page(&[], "", "")), PageUpdate::EndOfData { notify: false });

        assert_eq!(pager.page_index(), 1);
        assert_eq!(pager.next_cursor(), "c3");
        assert_eq!(pager.prev_cursor(), "c1");
        assert_eq!(pager.position.history.len(), 1);
        assert!(pager.has_any_transactions());
        assert_history_invariant(&pager);
    }

    #[test]
    fn test_error_after_prev_restores_history() {
        let mut pager = on_second_page();
        pager.load_prev();
        assert_eq!(pager.page_index(), 0);

        let update = pager.on_fetch_result(Err(AppError::Network("unreachable".to_string())));
        assert!(matches!(update, PageUpdate::Failed(AppError::Network(_))));
        assert_eq!(pager.page_index(), 1);
        assert_eq!(pager.next_cursor(), "c3");
        assert_eq!(pager.prev_cursor(), "c1");
        assert_eq!(pager.position.history.len(), 1);
        assert_history_invariant(&pager);

        assert_eq!(pager.load_prev(), Some(PageQuery::newer_than(10, "c1")));
    }

    #[test]
    fn test_prev_guarded_on_first_page() {
        let mut pager = TransactionPager::new(10);
        pager.load_first();
        pager.on_fetch_result(page(&["A"], "c2", "c0"));
        assert!(!pager.can_go_prev());
        assert_eq!(pager.load_prev(), None);
    }

    #[test]
    fn test_decode_cursor_page() {
        let reply = ApiReply::success(
            200,
            Some(json!({
                "items": [{ "created_at": "2024-03-05 14:07:00", "tx_type": "withdrawal", "amount": "40.00" }],
                "nextCursor": "1709647620000|9",
                "prevCursor": null
            })),
        );
        let page = decode_page(&reply).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].tx_type, "withdrawal");
        assert_eq!(page.items[0].amount, "40.00");
        assert_eq!(page.items[0].date, "05.03.2024 14:07");
        assert_eq!(page.next_cursor, "1709647620000|9");
        assert_eq!(page.prev_cursor, "");
    }

    #[test]
    fn test_decode_legacy_array() {
        let reply = ApiReply::success(200, Some(json!([{ "tx_type": "deposit", "amount": 100 }])));
        let page = decode_page(&reply).unwrap();
        assert_eq!(page.items[0].amount, "100");
        assert!(page.next_cursor.is_empty());
        assert!(page.prev_cursor.is_empty());
    }

    #[test]
    fn test_decode_failures() {
        assert_eq!(
            decode_page(&ApiReply::network_error("")),
            Err(AppError::Network(MSG_LOAD_FAILED.to_string()))
        );
        assert_eq!(
            decode_page(&ApiReply::http_error(400, None, "Invalid before cursor")),
            Err(AppError::Request("Invalid before cursor".to_string()))
        );
        assert_eq!(
            decode_page(&ApiReply::success(200, Some(json!("nope")))),
            Err(AppError::invalid_response())
        );
        assert_eq!(decode_page(&ApiReply::success(200, None)), Err(AppError::invalid_response()));
    }
}
