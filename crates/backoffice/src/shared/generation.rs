/// Счётчик поколений запросов.
///
/// Каждый новый запрос получает [`Ticket`]; ответ применяется только если
/// его билет всё ещё текущий, иначе он устарел и отбрасывается.
#[derive(Debug, Default, Clone)]
pub struct RequestGeneration {
    current: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Начать новый запрос; все ранее выданные билеты устаревают
    pub fn begin(&mut self) -> Ticket {
        self.current += 1;
        Ticket(self.current)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }

    /// Отменить запрос в полёте без запуска нового
    pub fn invalidate(&mut self) {
        self.current += 1;
    }
}
