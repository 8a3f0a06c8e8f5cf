mod streak_flow;
