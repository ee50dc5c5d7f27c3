/// Operator help shown by `help`
pub fn help_text() -> String {
    [
        "Bank Automat commands",
        "",
        "Start",
        "  start                      Begin a new session",
        "  login <card> <pin>         Log in with card number and PIN",
        "  role <name>                Pick the account (debit, credit, ...)",
        "",
        "Account",
        "  balance | bal              Refresh the balance",
        "  withdraw <amount> | w      Withdraw cash",
        "  w20 | w40 | w50 | w100     Withdraw a fixed amount",
        "",
        "Transactions",
        "  tx                         Show the transactions view",
        "  next | n                   Older transactions",
        "  prev | p                   Newer transactions",
        "  refresh | r                Reload the newest page",
        "  overview | o               Back to the overview",
        "",
        "  logout                     End the session",
        "  help                       Show this help",
        "  quit                       Exit",
    ]
    .join("\n")
}
